//! Core type definitions shared by the manifest and the resource graph.

/// URI scheme of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
    Tcp,
    Udp,
}

impl Scheme {
    pub const ALL: &'static [Scheme] = &[Scheme::Http, Scheme::Https, Scheme::Tcp, Scheme::Udp];

    /// Parse a lowercase scheme name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::Tcp => "tcp",
            Scheme::Udp => "udp",
        }
    }

    /// Returns true for schemes served through HTTP ingress.
    pub fn is_http(&self) -> bool {
        matches!(self, Scheme::Http | Scheme::Https)
    }

    /// Port a client uses when the binding doesn't pin one.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Scheme::Http => Some(80),
            Scheme::Https => Some(443),
            Scheme::Tcp | Scheme::Udp => None,
        }
    }
}

/// Network protocol of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl Protocol {
    pub const ALL: &'static [Protocol] = &[Protocol::Tcp, Protocol::Udp];

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

/// Application transport carried over a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    Http,
    Http2,
    Tcp,
    Udp,
}

impl Transport {
    pub const ALL: &'static [Transport] = &[
        Transport::Http,
        Transport::Http2,
        Transport::Tcp,
        Transport::Udp,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Http => "http",
            Transport::Http2 => "http2",
            Transport::Tcp => "tcp",
            Transport::Udp => "udp",
        }
    }

    /// Transport implied by a scheme when the manifest omits it.
    pub fn for_scheme(scheme: Scheme) -> Self {
        match scheme {
            Scheme::Http | Scheme::Https => Transport::Http,
            Scheme::Tcp => Transport::Tcp,
            Scheme::Udp => Transport::Udp,
        }
    }
}
