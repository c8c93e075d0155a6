// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// This module includes utilities for creating and using authentication policies for
/// requests made to the settings store.
use reqwest::Response;
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};

pub trait HTTPAuthentication {
    /// Sends a request built by `renew_request` under some authentication policy. The
    /// request might be rebuilt and sent more than once.
    fn with_authentication<F>(
        &self,
        client: &ClientWithMiddleware,
        renew_request: &F,
    ) -> impl Future<Output = Result<Response, reqwest_middleware::Error>>
    where
        F: Fn(&ClientWithMiddleware) -> RequestBuilder;
}

/// Authentication policy that does no authentication
#[derive(Debug, Clone)]
pub struct Unauthenticated {}

impl HTTPAuthentication for Unauthenticated {
    async fn with_authentication<F>(
        &self,
        client: &ClientWithMiddleware,
        renew_request: &F,
    ) -> Result<Response, reqwest_middleware::Error>
    where
        F: Fn(&ClientWithMiddleware) -> RequestBuilder,
    {
        renew_request(client).send().await
    }
}

/// Authentication policy that *always* sends a username/password pair
#[derive(Debug, Clone)]
pub struct ForceHTTPBasicAuth {
    pub username: String,
    pub password: String,
}

impl HTTPAuthentication for ForceHTTPBasicAuth {
    async fn with_authentication<F>(
        &self,
        client: &ClientWithMiddleware,
        renew_request: &F,
    ) -> Result<Response, reqwest_middleware::Error>
    where
        F: Fn(&ClientWithMiddleware) -> RequestBuilder,
    {
        renew_request(client)
            .basic_auth(self.username.clone(), Some(self.password.clone()))
            .send()
            .await
    }
}

/// Authentication policy that *always* sends a bearer token
#[derive(Debug, Clone)]
pub struct ForceBearerAuth {
    pub token: String,
}

impl HTTPAuthentication for ForceBearerAuth {
    async fn with_authentication<F>(
        &self,
        client: &ClientWithMiddleware,
        renew_request: &F,
    ) -> Result<Response, reqwest_middleware::Error>
    where
        F: Fn(&ClientWithMiddleware) -> RequestBuilder,
    {
        renew_request(client)
            .bearer_auth(self.token.clone())
            .send()
            .await
    }
}

/// First tries `Higher` priority authentication and then the
/// `Lower` priority one in case the first request results in
/// a response in the 4xx range.
#[derive(Debug, Clone)]
pub struct SequenceAuthentication<Higher, Lower> {
    pub higher: Higher,
    pub lower: Lower,
}

impl<Higher: HTTPAuthentication, Lower: HTTPAuthentication> HTTPAuthentication
    for SequenceAuthentication<Higher, Lower>
{
    async fn with_authentication<F>(
        &self,
        client: &ClientWithMiddleware,
        renew_request: &F,
    ) -> Result<Response, reqwest_middleware::Error>
    where
        F: Fn(&ClientWithMiddleware) -> RequestBuilder,
    {
        let initial_response = self.higher.with_authentication(client, renew_request).await?;

        // Object stores commonly answer 404 instead of 401 or 403 to anonymous requests.
        if initial_response.status().is_client_error() {
            self.lower.with_authentication(client, renew_request).await
        } else {
            Ok(initial_response)
        }
    }
}

/// Standard policy for the settings store: try without credentials first and
/// send the configured credentials in response to a 4xx status code.
#[derive(Debug, Clone)]
pub enum StandardHTTPAuthentication {
    Unauthenticated(Unauthenticated),
    Basic(SequenceAuthentication<Unauthenticated, ForceHTTPBasicAuth>),
    Bearer(SequenceAuthentication<Unauthenticated, ForceBearerAuth>),
}

impl Default for StandardHTTPAuthentication {
    fn default() -> Self {
        StandardHTTPAuthentication::Unauthenticated(Unauthenticated {})
    }
}

impl StandardHTTPAuthentication {
    pub fn basic<S: AsRef<str>, T: AsRef<str>>(username: S, password: T) -> Self {
        StandardHTTPAuthentication::Basic(SequenceAuthentication {
            higher: Unauthenticated {},
            lower: ForceHTTPBasicAuth {
                username: username.as_ref().to_string(),
                password: password.as_ref().to_string(),
            },
        })
    }

    pub fn bearer<S: AsRef<str>>(token: S) -> Self {
        StandardHTTPAuthentication::Bearer(SequenceAuthentication {
            higher: Unauthenticated {},
            lower: ForceBearerAuth {
                token: token.as_ref().to_string(),
            },
        })
    }
}

impl HTTPAuthentication for StandardHTTPAuthentication {
    async fn with_authentication<F>(
        &self,
        client: &ClientWithMiddleware,
        renew_request: &F,
    ) -> Result<Response, reqwest_middleware::Error>
    where
        F: Fn(&ClientWithMiddleware) -> RequestBuilder,
    {
        match self {
            StandardHTTPAuthentication::Unauthenticated(policy) => {
                policy.with_authentication(client, renew_request).await
            }
            StandardHTTPAuthentication::Basic(policy) => {
                policy.with_authentication(client, renew_request).await
            }
            StandardHTTPAuthentication::Bearer(policy) => {
                policy.with_authentication(client, renew_request).await
            }
        }
    }
}
