//! Redirect construction for authorization decisions.
//!
//! Both decision paths end in a single redirect back to the client. This
//! module resolves which registered URI to use and how response parameters
//! are appended to it.
//!
//! # Separator rule
//!
//! - Implicit grant: `#`, regardless of an existing query string
//! - Otherwise: `&` when the URI already contains `?`, else `?`
//!
//! # Wire shape on deny
//!
//! ```text
//! {uri}{sep}error=access_denied&state={state}
//! ```
//!
//! The state is appended verbatim. It arrives already percent-encoded from
//! the incoming request and is not encoded a second time.

use serde::Serialize;
use url::form_urlencoded;

use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::grant::IssuedGrant;
use crate::oauth::request::AuthorizationRequest;
use crate::types::GrantType;

/// OAuth 2.0 error code sent when the resource owner denies the request.
pub const ACCESS_DENIED: &str = "access_denied";

/// Redirect produced by an authorization decision.
///
/// Rendered as `302 Found` with a `Location` header and no body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectTarget {
    location: String,
}

impl RedirectTarget {
    /// Creates a redirect to `location`.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }

    /// Returns the target URI.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Consumes the redirect, returning the target URI.
    #[must_use]
    pub fn into_location(self) -> String {
        self.location
    }
}

/// Resolves the redirect URI for a pending request.
///
/// Returns the requested URI when it is registered for the client, otherwise
/// the first non-empty registered URI. An unregistered URI is never an error.
///
/// # Errors
///
/// Returns `InvalidClient` only when the client has no registered URI at all.
pub fn resolve_redirect_uri(request: &AuthorizationRequest) -> AuthResult<&str> {
    let registered = &request.client.redirect_uris;

    if let Some(requested) = request.requested_redirect_uri()
        && registered.contains(requested)
    {
        return Ok(requested);
    }

    registered
        .first()
        .ok_or_else(|| AuthError::invalid_client("Client has no registered redirect URI"))
}

/// Returns the separator placed between `uri` and the response parameters.
#[must_use]
pub fn separator_for(grant_type: GrantType, uri: &str) -> char {
    if grant_type.uses_fragment() {
        '#'
    } else if uri.contains('?') {
        '&'
    } else {
        '?'
    }
}

/// Builds the `access_denied` redirect.
///
/// `state` is inserted verbatim; `None` renders as an empty value.
#[must_use]
pub fn access_denied_redirect(
    uri: &str,
    grant_type: GrantType,
    state: Option<&str>,
) -> RedirectTarget {
    let separator = separator_for(grant_type, uri);
    RedirectTarget::new(format!(
        "{uri}{separator}error={ACCESS_DENIED}&state={}",
        state.unwrap_or_default()
    ))
}

/// Builds the success redirect for an issued grant.
///
/// Parameters are form-urlencoded. The authorization code travels in the
/// query string; an implicit access token travels in the fragment.
#[must_use]
pub fn grant_redirect(
    uri: &str,
    grant_type: GrantType,
    grant: &IssuedGrant,
    state: Option<&str>,
) -> RedirectTarget {
    let mut params = form_urlencoded::Serializer::new(String::new());
    match grant {
        IssuedGrant::Code { code } => {
            params.append_pair("code", code);
        }
        IssuedGrant::AccessToken {
            access_token,
            token_type,
            expires_in,
        } => {
            params
                .append_pair("access_token", access_token)
                .append_pair("token_type", token_type)
                .append_pair("expires_in", &expires_in.to_string());
        }
    }
    if let Some(state) = state {
        params.append_pair("state", state);
    }

    let separator = separator_for(grant_type, uri);
    RedirectTarget::new(format!("{uri}{separator}{}", params.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Client;

    fn request_for(registered: Vec<&str>, requested: Option<&str>) -> AuthorizationRequest {
        let client = Client::new(
            "test-client",
            registered.into_iter().map(String::from).collect::<Vec<_>>(),
        );
        let mut request = AuthorizationRequest::new(client, GrantType::AuthorizationCode);
        request.redirect_uri = requested.map(String::from);
        request
    }

    #[test]
    fn test_registered_uri_is_used() {
        let request = request_for(
            vec!["https://a.example/cb", "https://b.example/cb"],
            Some("https://b.example/cb"),
        );
        assert_eq!(resolve_redirect_uri(&request).unwrap(), "https://b.example/cb");
    }

    #[test]
    fn test_unregistered_uri_falls_back_to_first() {
        let request = request_for(
            vec!["https://a.example/cb", "https://b.example/cb"],
            Some("https://evil.example/cb"),
        );
        assert_eq!(resolve_redirect_uri(&request).unwrap(), "https://a.example/cb");
    }

    #[test]
    fn test_missing_uri_falls_back_to_first() {
        let request = request_for(vec!["https://a.example/cb"], None);
        assert_eq!(resolve_redirect_uri(&request).unwrap(), "https://a.example/cb");

        let request = request_for(vec!["https://a.example/cb"], Some(""));
        assert_eq!(resolve_redirect_uri(&request).unwrap(), "https://a.example/cb");
    }

    #[test]
    fn test_empty_registered_entries_are_skipped() {
        let request = request_for(vec!["", "https://a.example/cb"], Some("https://evil.example/cb"));
        assert_eq!(resolve_redirect_uri(&request).unwrap(), "https://a.example/cb");
        assert!(request.client.validate().is_ok());
    }

    #[test]
    fn test_no_registered_uri_is_invalid_client() {
        let request = request_for(vec![], Some("https://a.example/cb"));
        assert!(matches!(
            resolve_redirect_uri(&request),
            Err(AuthError::InvalidClient { .. })
        ));

        let request = request_for(vec!["", ""], None);
        assert!(matches!(
            resolve_redirect_uri(&request),
            Err(AuthError::InvalidClient { .. })
        ));
        assert!(request.client.validate().is_err());
    }

    #[test]
    fn test_separator_rule() {
        assert_eq!(separator_for(GrantType::Implicit, "https://a.example/cb"), '#');
        assert_eq!(separator_for(GrantType::Implicit, "https://a.example/cb?x=1"), '#');
        assert_eq!(
            separator_for(GrantType::AuthorizationCode, "https://a.example/cb"),
            '?'
        );
        assert_eq!(
            separator_for(GrantType::AuthorizationCode, "https://a.example/cb?x=1"),
            '&'
        );
    }

    #[test]
    fn test_access_denied_redirect_keeps_state_verbatim() {
        let target = access_denied_redirect(
            "https://a.example/cb",
            GrantType::AuthorizationCode,
            Some("a%20b"),
        );
        assert_eq!(
            target.location(),
            "https://a.example/cb?error=access_denied&state=a%20b"
        );

        let target = access_denied_redirect("https://a.example/cb", GrantType::Implicit, None);
        assert_eq!(
            target.location(),
            "https://a.example/cb#error=access_denied&state="
        );
    }

    #[test]
    fn test_code_redirect() {
        let grant = IssuedGrant::Code {
            code: "c0de".to_string(),
        };
        let target = grant_redirect(
            "https://a.example/cb?foo=1",
            GrantType::AuthorizationCode,
            &grant,
            Some("s t"),
        );
        assert_eq!(
            target.location(),
            "https://a.example/cb?foo=1&code=c0de&state=s+t"
        );
    }

    #[test]
    fn test_implicit_redirect_uses_fragment() {
        let grant = IssuedGrant::AccessToken {
            access_token: "tok".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 3600,
        };
        let target = grant_redirect("https://a.example/cb", GrantType::Implicit, &grant, None);
        assert_eq!(
            target.location(),
            "https://a.example/cb#access_token=tok&token_type=Bearer&expires_in=3600"
        );
    }
}
