use reqwest::{StatusCode, Url};
use roster::{EventRecord, ParticipantRecord, decode_event, decode_participants};
use tracing::debug;

use crate::api::{BoxFuture, EventsApi};
use crate::config::ClientConfig;
use crate::error::FetchError;

/// [`EventsApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpEventsApi {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpEventsApi {
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        let base_url = Url::parse(&config.api_base_url)
            .map_err(|e| FetchError::Config(format!("{}: {e}", config.api_base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::Config(format!(
                "{} cannot be used as a base URL",
                config.api_base_url
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| FetchError::Config(e.to_string()))?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `segments` are percent-encoded, so event codes cannot escape the path.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_text(&self, code: &str, url: Url) -> Result<String, FetchError> {
        debug!(%url, "fetching");
        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        match resp.status() {
            StatusCode::NOT_FOUND => return Err(FetchError::EventNotFound(code.to_string())),
            StatusCode::GONE => return Err(FetchError::EventEnded(code.to_string())),
            s if !s.is_success() => {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: s.as_u16(),
                });
            }
            _ => {}
        }

        resp.text().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })
    }
}

impl EventsApi for HttpEventsApi {
    fn fetch_event<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Result<EventRecord, FetchError>> {
        Box::pin(async move {
            let body = self.get_text(code, self.endpoint(&["events", code])).await?;
            Ok(decode_event(&body)?)
        })
    }

    fn fetch_participants<'a>(
        &'a self,
        code: &'a str,
    ) -> BoxFuture<'a, Result<Vec<ParticipantRecord>, FetchError>> {
        Box::pin(async move {
            let url = self.endpoint(&["events", code, "participants"]);
            let body = self.get_text(code, url).await?;
            Ok(decode_participants(&body)?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::HttpEventsApi;
    use crate::api::EventsApi;
    use crate::config::ClientConfig;
    use crate::error::FetchError;
    use axum::Router;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;

    async fn get_event(Path(code): Path<String>) -> Response {
        match code.as_str() {
            "nyc" => (
                [("content-type", "application/json")],
                r#"{"name":"DevFest NYC","description":"Way back home","active":true}"#,
            )
                .into_response(),
            "ended" => (StatusCode::GONE, "Event has ended").into_response(),
            "flaky" => (StatusCode::SERVICE_UNAVAILABLE, "down").into_response(),
            "garbled" => (StatusCode::OK, "<html>").into_response(),
            _ => (StatusCode::NOT_FOUND, "Event not found").into_response(),
        }
    }

    async fn get_participants(Path(code): Path<String>) -> Response {
        if code != "nyc" {
            return (StatusCode::NOT_FOUND, "Event not found").into_response();
        }
        (
            [("content-type", "application/json")],
            r#"[{"participant_id":"p1","username":"ada","x":50,"y":50,
                 "level_1_complete":true,"level_2_complete":true,"event_code":"nyc"}]"#,
        )
            .into_response()
    }

    async fn serve(prefix: &str) -> ClientConfig {
        let routes = Router::new()
            .route("/events/:code", get(get_event))
            .route("/events/:code/participants", get(get_participants));
        let app = if prefix.is_empty() {
            routes
        } else {
            Router::new().nest(prefix, routes)
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        ClientConfig {
            api_base_url: format!("http://{addr}{prefix}"),
            ..ClientConfig::default()
        }
    }

    #[tokio::test]
    async fn fetches_event_and_participants() {
        let api = HttpEventsApi::new(&serve("").await).unwrap();

        let event = api.fetch_event("nyc").await.unwrap();
        assert_eq!(event.name, "DevFest NYC");
        assert!(event.active);

        let participants = api.fetch_participants("nyc").await.unwrap();
        assert_eq!(participants.len(), 1);
        assert_eq!(participants[0].participant_id, "p1");
        assert!(participants[0].level_2_complete);
    }

    #[tokio::test]
    async fn base_path_is_preserved() {
        let mut cfg = serve("/api").await;
        cfg.api_base_url.push('/');
        let api = HttpEventsApi::new(&cfg).unwrap();
        assert!(api.fetch_event("nyc").await.is_ok());
    }

    #[tokio::test]
    async fn maps_status_codes() {
        let api = HttpEventsApi::new(&serve("").await).unwrap();

        assert!(matches!(
            api.fetch_event("nope").await,
            Err(FetchError::EventNotFound(code)) if code == "nope"
        ));
        assert!(matches!(
            api.fetch_event("ended").await,
            Err(FetchError::EventEnded(code)) if code == "ended"
        ));
        assert!(matches!(
            api.fetch_event("flaky").await,
            Err(FetchError::Status { status: 503, .. })
        ));
        assert!(matches!(
            api.fetch_participants("nope").await,
            Err(FetchError::EventNotFound(_))
        ));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let api = HttpEventsApi::new(&serve("").await).unwrap();
        assert!(matches!(
            api.fetch_event("garbled").await,
            Err(FetchError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_backend_is_an_http_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = HttpEventsApi::new(&ClientConfig {
            api_base_url: format!("http://{addr}"),
            ..ClientConfig::default()
        })
        .unwrap();
        assert!(matches!(
            api.fetch_event("nyc").await,
            Err(FetchError::Http { .. })
        ));
    }

    #[test]
    fn rejects_unusable_base_urls() {
        for bad in ["not a url", "mailto:someone@example.com"] {
            let cfg = ClientConfig {
                api_base_url: bad.to_string(),
                ..ClientConfig::default()
            };
            assert!(matches!(
                HttpEventsApi::new(&cfg),
                Err(FetchError::Config(_))
            ));
        }
    }

    #[test]
    fn event_codes_are_path_encoded() {
        let api = HttpEventsApi::new(&ClientConfig::default()).unwrap();
        let url = api.endpoint(&["events", "a/b c"]);
        assert_eq!(url.as_str(), "http://localhost:8080/events/a%2Fb%20c");
    }
}
