//! Backend base-URL derivation from the page origin a client runs under.

/// Scheme, host and optional explicit port of an origin such as
/// `https://trustagency.info:8443`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
}

impl Origin {
    /// Parse `scheme://host[:port][/...]`. Returns `None` for anything else.
    pub fn parse(origin: &str) -> Option<Self> {
        let (scheme, rest) = origin.trim().split_once("://")?;
        let scheme = scheme.to_ascii_lowercase();
        if scheme != "http" && scheme != "https" {
            return None;
        }
        let authority = rest.split(['/', '?', '#']).next()?;
        // A bracketed IPv6 host only has a port after the closing `]`.
        let port_search_start = authority.rfind(']').map_or(0, |idx| idx + 1);
        let (host, port) = match authority[port_search_start..].rfind(':') {
            Some(idx) => {
                let split = port_search_start + idx;
                let port = authority[split + 1..].parse::<u16>().ok()?;
                (&authority[..split], Some(port))
            }
            None => (authority, None),
        };
        if host.is_empty() {
            return None;
        }
        Some(Self {
            scheme,
            host: host.to_string(),
            port,
        })
    }

    pub fn default_port(&self) -> u16 {
        if self.scheme == "https" {
            443
        } else {
            80
        }
    }

    pub fn is_local(&self) -> bool {
        self.host == "localhost" || self.host == "127.0.0.1" || self.host == "[::1]"
    }
}

/// Admin console backend: local origins talk to the API on port 8001,
/// deployed origins to the same scheme, host and port.
pub fn derive_admin_base_url(origin: &str) -> Option<String> {
    let origin = Origin::parse(origin)?;
    if origin.is_local() {
        return Some(format!("{}://{}:8001", origin.scheme, origin.host));
    }
    Some(match origin.port {
        Some(port) => format!("{}://{}:{}", origin.scheme, origin.host, port),
        None => format!("{}://{}", origin.scheme, origin.host),
    })
}

/// Public site API root: a static file server on port 8000 maps to the
/// API on 8001; otherwise the page's own port. Always suffixed `/api`.
pub fn derive_site_api_url(origin: &str) -> Option<String> {
    let origin = Origin::parse(origin)?;
    let port = match origin.port {
        Some(8000) => 8001,
        Some(port) => port,
        None => origin.default_port(),
    };
    Some(format!("{}://{}:{}/api", origin.scheme, origin.host, port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_local_origins_use_8001() {
        assert_eq!(
            derive_admin_base_url("http://localhost:8000").as_deref(),
            Some("http://localhost:8001")
        );
        assert_eq!(
            derive_admin_base_url("http://127.0.0.1").as_deref(),
            Some("http://127.0.0.1:8001")
        );
    }

    #[test]
    fn admin_remote_origins_keep_port() {
        assert_eq!(
            derive_admin_base_url("https://trustagency.info/admin/").as_deref(),
            Some("https://trustagency.info")
        );
        assert_eq!(
            derive_admin_base_url("https://trustagency.info:8443").as_deref(),
            Some("https://trustagency.info:8443")
        );
    }

    #[test]
    fn site_api_url() {
        assert_eq!(
            derive_site_api_url("http://localhost:8000").as_deref(),
            Some("http://localhost:8001/api")
        );
        assert_eq!(
            derive_site_api_url("https://trustagency.info").as_deref(),
            Some("https://trustagency.info:443/api")
        );
        assert_eq!(
            derive_site_api_url("http://example.com:9000/page").as_deref(),
            Some("http://example.com:9000/api")
        );
    }

    #[test]
    fn bracketed_ipv6_hosts() {
        assert_eq!(
            Origin::parse("http://[::1]"),
            Some(Origin {
                scheme: "http".into(),
                host: "[::1]".into(),
                port: None,
            })
        );
        assert_eq!(Origin::parse("https://[2001:db8::1]:8443/x").unwrap().port, Some(8443));
        assert_eq!(
            derive_admin_base_url("http://[::1]:8000").as_deref(),
            Some("http://[::1]:8001")
        );
        assert_eq!(
            derive_site_api_url("http://[2001:db8::1]").as_deref(),
            Some("http://[2001:db8::1]:80/api")
        );
    }

    #[test]
    fn rejects_non_http_origins() {
        assert!(Origin::parse("file:///index.html").is_none());
        assert!(Origin::parse("localhost:8000").is_none());
        assert!(Origin::parse("http://host:notaport").is_none());
    }
}
