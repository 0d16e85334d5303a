pub mod auth;
pub mod recipes;

use serde::Serialize;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{OpenApi, ToSchema};

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Generate the complete OpenAPI spec by merging all module specs.
/// The session cookie name is deployment-configured, so the caller passes it in.
pub fn openapi(cookie_name: &str) -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(components(schemas(ErrorResponse)))]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    // Auth is cookie-based; document the session cookie as an API key
    if let Some(components) = spec.components.as_mut() {
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(cookie_name.to_string()))),
        );
    }

    let modules: Vec<utoipa::openapi::OpenApi> =
        vec![auth::ApiDoc::openapi(), recipes::ApiDoc::openapi()];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_scheme_uses_configured_cookie_name() {
        let spec = openapi("flavor_session");
        let components = spec.components.expect("spec has components");
        match components.security_schemes.get("session_cookie") {
            Some(SecurityScheme::ApiKey(ApiKey::Cookie(value))) => {
                assert_eq!(value.name, "flavor_session");
            }
            _ => panic!("session_cookie scheme missing or not a cookie key"),
        }
    }
}
