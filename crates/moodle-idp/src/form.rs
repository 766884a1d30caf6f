//! Hidden-field form extraction from provider HTML
//!
//! After credentials are accepted, the identity provider answers with a
//! page whose only purpose is to auto-submit a hidden form carrying the
//! federation handshake fields back to the platform. Browsers submit it via
//! JavaScript; we parse it out of the markup instead.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Hidden login form: where to post, and the two handshake fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub submit_url: String,
    pub relay_state: String,
    pub saml_response: String,
}

/// Pattern for the auto-submit form block: action URL first, then the
/// hidden `RelayState` and `SAMLResponse` inputs in document order,
/// possibly separated by line breaks (`(?s)` lets `.` cross them).
static LOGIN_FORM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?s)<form action="(?P<submit_url>[^"]*)" method="post">"#,
        r#".*<input type="hidden" name="RelayState" value="(?P<relay_state>[^"]*)"/>"#,
        r#".*<input type="hidden" name="SAMLResponse" value="(?P<saml_response>[^"]*)"/>"#,
    ))
    .unwrap()
});

/// Pattern for the hidden CSRF token input on the provider's login page
static CSRF_TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<input type="hidden" name="csrf_token" value="(?P<token>[^"]*)""#).unwrap()
});

/// Numeric character references, decimal and hex
static NUMERIC_ENTITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#([xX][0-9a-fA-F]+|[0-9]+);").unwrap());

/// Extract the auto-submit login form from entity-unescaped HTML.
///
/// Callers holding a raw response body should run [`unescape`] first. No
/// match means either the provider changed its page format or the response
/// was something else entirely (for a credential POST, typically the login
/// page again - wrong password).
pub fn extract_login_form(html: &str) -> Result<LoginForm> {
    let captures = LOGIN_FORM_PATTERN
        .captures(html)
        .ok_or_else(|| Error::Parse("login form not found".into()))?;
    Ok(LoginForm {
        submit_url: captures["submit_url"].to_string(),
        relay_state: captures["relay_state"].to_string(),
        saml_response: captures["saml_response"].to_string(),
    })
}

/// Extract the hidden `csrf_token` value from a provider login page.
pub fn extract_csrf_token(html: &str) -> Result<String> {
    let captures = CSRF_TOKEN_PATTERN
        .captures(html)
        .ok_or_else(|| Error::Auth("csrf token not found".into()))?;
    Ok(captures["token"].to_string())
}

/// Resolve the HTML entities providers escape attribute values with.
///
/// Handles numeric character references plus the named entities seen in
/// practice. `&amp;` is resolved last so that doubly-escaped text decodes
/// one level, the way a browser would.
pub fn unescape(html: &str) -> String {
    let decoded = NUMERIC_ENTITY_PATTERN.replace_all(html, |caps: &regex::Captures<'_>| {
        let body = &caps[1];
        let code = match body.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => body.parse::<u32>(),
        };
        match code.ok().and_then(char::from_u32) {
            Some(ch) => ch.to_string(),
            None => caps[0].to_string(),
        }
    });
    decoded
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SSO_RESPONSE_PAGE: &str = r#"<html>
<body onload="document.forms[0].submit()">
<noscript><p>Since your browser does not support JavaScript,
you must press the Continue button once to proceed.</p></noscript>
<form action="https://moodle.example.org/auth/shibboleth/index.php" method="post">
<div>
<input type="hidden" name="RelayState" value="token-relay-42"/>
<input type="hidden" name="SAMLResponse" value="PHNhbWxwOlJlc3BvbnNlPg=="/>
</div>
<noscript>
<div><input type="submit" value="Continue"/></div>
</noscript>
</form>
</body>
</html>"#;

    #[test]
    fn extracts_submit_url_relay_state_and_assertion() {
        let form = extract_login_form(SSO_RESPONSE_PAGE).unwrap();
        assert_eq!(
            form,
            LoginForm {
                submit_url: "https://moodle.example.org/auth/shibboleth/index.php".into(),
                relay_state: "token-relay-42".into(),
                saml_response: "PHNhbWxwOlJlc3BvbnNlPg==".into(),
            }
        );
    }

    #[test]
    fn missing_assertion_field_is_a_parse_error() {
        let page = r#"<form action="https://x.example/post" method="post">
<input type="hidden" name="RelayState" value="r"/>
</form>"#;
        match extract_login_form(page) {
            Err(Error::Parse(message)) => assert_eq!(message, "login form not found"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn plain_login_page_is_a_parse_error() {
        let page = r#"<form method="post"><input name="j_username"/></form>"#;
        assert!(matches!(
            extract_login_form(page),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn escaped_markup_extracts_after_unescaping() {
        // Responses arrive with attribute values entity-escaped; the base64
        // payload must survive the round trip intact.
        let escaped = SSO_RESPONSE_PAGE
            .replace(
                "PHNhbWxwOlJlc3BvbnNlPg==",
                "PHNhbWxwOlJlc3BvbnNlPg&#x3d;&#x3d;",
            )
            .replace("token-relay-42", "token&#45;relay&#45;42");
        let form = extract_login_form(&unescape(&escaped)).unwrap();
        assert_eq!(form.saml_response, "PHNhbWxwOlJlc3BvbnNlPg==");
        assert_eq!(form.relay_state, "token-relay-42");
    }

    #[test]
    fn unescape_resolves_named_and_numeric_entities() {
        assert_eq!(unescape("a &amp; b"), "a & b");
        assert_eq!(unescape("&lt;tag&gt;"), "<tag>");
        assert_eq!(unescape("&quot;x&quot; &apos;y&apos;"), "\"x\" 'y'");
        assert_eq!(unescape("&#43;&#x2B;&#X2b;"), "+++");
    }

    #[test]
    fn unescape_decodes_double_escaping_one_level() {
        assert_eq!(unescape("&amp;lt;"), "&lt;");
        assert_eq!(unescape("&amp;#43;"), "&#43;");
    }

    #[test]
    fn unescape_leaves_invalid_references_alone() {
        assert_eq!(unescape("&#xZZ;"), "&#xZZ;");
        assert_eq!(unescape("&#1114112;"), "&#1114112;");
        assert_eq!(unescape("&unknown;"), "&unknown;");
    }

    #[test]
    fn extracts_csrf_token_from_login_page() {
        let page = r#"<form action="/idp/profile/SAML2/Redirect/SSO?execution=e1s1" method="post">
<input type="hidden" name="csrf_token" value="_c9f83452aa171c6d4e296ae27e2b6d41"/>
<input type="text" name="j_username"/>
</form>"#;
        assert_eq!(
            extract_csrf_token(page).unwrap(),
            "_c9f83452aa171c6d4e296ae27e2b6d41"
        );
    }

    #[test]
    fn missing_csrf_token_is_an_auth_error() {
        match extract_csrf_token("<form></form>") {
            Err(Error::Auth(message)) => assert_eq!(message, "csrf token not found"),
            other => panic!("expected auth error, got {other:?}"),
        }
    }
}
