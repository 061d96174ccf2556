use config::{AnyOrList, CorsConfig};
use http::{HeaderName, HeaderValue};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer, ExposeHeaders};
use url::Url;

/// Builds the CORS layer from an explicit `[server.cors]` section.
pub(super) fn generate(config: &CorsConfig) -> CorsLayer {
    let mut cors_layer = CorsLayer::new()
        .allow_credentials(config.allow_credentials)
        .allow_private_network(config.allow_private_network);

    if let Some(origins) = &config.allow_origins {
        cors_layer = cors_layer.allow_origin(match origins {
            AnyOrList::Any => AllowOrigin::any(),
            AnyOrList::List(origins) => allow_origin(origins),
        });
    }

    if let Some(max_age) = config.max_age {
        cors_layer = cors_layer.max_age(max_age);
    }

    if let Some(methods) = &config.allow_methods {
        cors_layer = cors_layer.allow_methods(match methods {
            AnyOrList::Any => AllowMethods::any(),
            AnyOrList::List(methods) => {
                let mut methods: Vec<http::Method> = methods.iter().map(|m| m.as_method().clone()).collect();

                // preflight requests must always pass
                if !methods.contains(&http::Method::OPTIONS) {
                    methods.push(http::Method::OPTIONS);
                }

                AllowMethods::list(methods)
            }
        });
    }

    if let Some(headers) = &config.allow_headers {
        cors_layer = cors_layer.allow_headers(match headers {
            AnyOrList::Any => AllowHeaders::any(),
            AnyOrList::List(headers) => AllowHeaders::list(header_names(headers.iter().map(|h| h.as_str()))),
        });
    }

    if let Some(headers) = &config.expose_headers {
        cors_layer = cors_layer.expose_headers(match headers {
            AnyOrList::Any => ExposeHeaders::any(),
            AnyOrList::List(headers) => ExposeHeaders::list(header_names(headers.iter().map(|h| h.as_str()))),
        });
    }

    cors_layer
}

fn allow_origin(origins: &[Url]) -> AllowOrigin {
    let mut exact = Vec::new();
    let mut globs = Vec::new();

    for origin in origins {
        let origin = &origin[..url::Position::BeforePath];

        if origin.chars().any(|c| "?*[]{}!\\".contains(c)) {
            globs.push(origin.to_owned());
        } else {
            match HeaderValue::from_str(origin) {
                Ok(value) => exact.push(value),
                Err(e) => log::warn!("Ignoring CORS origin '{origin}': {e}"),
            }
        }
    }

    if globs.is_empty() {
        return AllowOrigin::list(exact);
    }

    AllowOrigin::predicate(move |origin, _| {
        if exact.iter().any(|value| value == origin) {
            return true;
        }

        let Ok(origin) = origin.to_str() else {
            return false;
        };

        globs.iter().any(|glob| fast_glob::glob_match(glob, origin))
    })
}

fn header_names<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<HeaderName> {
    headers
        .filter_map(|header| match HeaderName::from_bytes(header.as_bytes()) {
            Ok(name) => Some(name),
            Err(e) => {
                log::warn!("Ignoring CORS header '{header}': {e}");
                None
            }
        })
        .collect()
}
