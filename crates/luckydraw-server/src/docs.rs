// OpenAPI document and Swagger UI page for the HTTP surface.

use serde_json::{json, Value};

/// Path of the interactive documentation page.
pub const DOCS_PATH: &str = "/api-docs";
/// Path of the raw OpenAPI JSON document.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": {
                    "type": "object",
                    "properties": { "error": { "type": "string" } }
                }
            }
        }
    })
}

fn object_response(description: &str, properties: Value) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "type": "object", "properties": properties }
            }
        }
    })
}

fn int_array() -> Value {
    json!({ "type": "array", "items": { "type": "integer" } })
}

fn draw_properties() -> Value {
    json!({
        "randomIndex": { "type": "integer" },
        "randomValue": { "type": "integer" },
        "entries": int_array()
    })
}

fn json_body(properties: Value) -> Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "type": "object", "properties": properties }
            }
        }
    })
}

/// Build the OpenAPI 3.0 document describing every route, advertising
/// `server_url` as the base URL.
pub fn api_doc(server_url: &str) -> Value {
    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Random Number API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "API for generating random numbers"
        },
        "servers": [{ "url": server_url }],
        "paths": {
            "/drawn": {
                "get": {
                    "summary": "Draw from entries",
                    "responses": {
                        "200": object_response("A random number from all entries", draw_properties()),
                        "400": error_response("No entries have been drawn")
                    }
                },
                "put": {
                    "summary": "Draw from given entries",
                    "requestBody": json_body(json!({ "entries": int_array() })),
                    "responses": {
                        "200": object_response("A random number from given entries", draw_properties()),
                        "400": error_response("Invalid array parameter")
                    }
                }
            },
            "/entry": {
                "post": {
                    "summary": "Add a new entry randomly",
                    "requestBody": json_body(json!({ "max": { "type": "integer", "minimum": 1 } })),
                    "responses": {
                        "201": object_response(
                            "A unique random number",
                            json!({ "entry": { "type": "integer" } })
                        ),
                        "400": error_response("Invalid max parameter, or all numbers have been drawn")
                    }
                }
            },
            "/entries": {
                "get": {
                    "summary": "List all entries",
                    "responses": {
                        "200": object_response("All entries", json!({ "entries": int_array() }))
                    }
                },
                "delete": {
                    "summary": "Delete all entries",
                    "responses": {
                        "200": object_response(
                            "All entries have been deleted",
                            json!({ "entries": int_array() })
                        )
                    }
                }
            },
            "/uniqueRandom": {
                "get": {
                    "summary": "Get a unique random number between 1 and max",
                    "parameters": [{
                        "in": "query",
                        "name": "max",
                        "required": true,
                        "schema": { "type": "integer", "minimum": 1 },
                        "description": "The maximum number for the random draw"
                    }],
                    "responses": {
                        "200": object_response(
                            "A unique random number",
                            json!({ "randomNumber": { "type": "integer" } })
                        ),
                        "400": error_response("Invalid max parameter, or all numbers have been drawn")
                    }
                }
            }
        }
    })
}

/// HTML page that renders the document with Swagger UI.
pub fn swagger_page() -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>Random Number API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.onload = () => {{
      window.ui = SwaggerUIBundle({{ url: "{OPENAPI_PATH}", dom_id: "#swagger-ui" }});
    }};
  </script>
</body>
</html>
"##
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = api_doc("http://localhost:3000");
        let paths = doc["paths"].as_object().unwrap();
        let mut names: Vec<&str> = paths.keys().map(String::as_str).collect();
        names.sort_unstable();
        assert_eq!(names, ["/drawn", "/entries", "/entry", "/uniqueRandom"]);

        assert!(doc["paths"]["/drawn"]["get"].is_object());
        assert!(doc["paths"]["/drawn"]["put"].is_object());
        assert!(doc["paths"]["/entries"]["delete"].is_object());
        assert!(doc["paths"]["/entry"]["post"]["responses"]["201"].is_object());
    }

    #[test]
    fn document_carries_server_url_and_version() {
        let doc = api_doc("http://10.0.0.1:8080");
        assert_eq!(doc["openapi"], "3.0.0");
        assert_eq!(doc["servers"][0]["url"], "http://10.0.0.1:8080");
        assert_eq!(doc["info"]["version"], env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn swagger_page_points_at_document() {
        let page = swagger_page();
        assert!(page.contains(r#"url: "/api-docs/openapi.json""#));
        assert!(page.contains("SwaggerUIBundle({ url"));
        assert!(page.contains(r##"dom_id: "#swagger-ui""##));
        assert!(page.trim_end().ends_with("</html>"));
    }
}
