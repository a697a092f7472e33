//! Shared `ureq` plumbing for the Grafana and GitHub clients.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::SyncError;

/// Agent with the per-request timeout applied.
pub(crate) fn agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new().timeout(timeout).build()
}

/// Map a `ureq` outcome to a response or a [`SyncError`] naming `url`.
pub(crate) fn check(
    url: &str,
    result: Result<ureq::Response, ureq::Error>,
) -> Result<ureq::Response, SyncError> {
    match result {
        Ok(response) => Ok(response),
        Err(ureq::Error::Status(status, response)) => Err(SyncError::Status {
            url: url.to_string(),
            status,
            body: response.into_string().unwrap_or_default(),
        }),
        Err(ureq::Error::Transport(transport)) => Err(SyncError::Transport {
            url: url.to_string(),
            message: transport.to_string(),
        }),
    }
}

/// [`check`] and then deserialize the JSON body.
pub(crate) fn json<T: DeserializeOwned>(
    url: &str,
    result: Result<ureq::Response, ureq::Error>,
) -> Result<T, SyncError> {
    check(url, result)?
        .into_json()
        .map_err(|source| SyncError::Decode {
            url: url.to_string(),
            source,
        })
}

pub(crate) fn trim_base(url: &str) -> &str {
    url.trim_end_matches('/')
}

#[cfg(test)]
pub(crate) mod test_server {
    //! `wiremock` server driven from synchronous tests.

    use std::net::TcpListener;

    use tokio::runtime::Runtime;
    use wiremock::{Mock, MockServer, Request};

    /// A running [`MockServer`] plus the runtime that owns it.
    pub(crate) struct TestServer {
        // Dropped before the runtime it was started on.
        server: MockServer,
        runtime: Runtime,
    }

    impl TestServer {
        pub(crate) fn start() -> Self {
            let runtime = Runtime::new().expect("tokio runtime");
            let server = runtime.block_on(MockServer::start());
            Self { server, runtime }
        }

        pub(crate) fn mount(&self, mock: Mock) {
            self.runtime.block_on(mock.mount(&self.server));
        }

        pub(crate) fn uri(&self) -> String {
            self.server.uri()
        }

        pub(crate) fn requests(&self) -> Vec<Request> {
            self.runtime
                .block_on(self.server.received_requests())
                .expect("request recording enabled")
        }
    }

    /// An address nothing listens on.
    pub(crate) fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);
        format!("http://{addr}")
    }
}
