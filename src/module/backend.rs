use std::{fmt, str::FromStr};

/// The two server backends the module knows how to wire into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerBackend {
    /// Middleware-stack backend: CORS can be registered at runtime and bodies
    /// are parsed before handlers run.
    Layered,
    /// Reply-streaming backend: CORS belongs to server construction, bodies
    /// are never parsed up front, multipart needs explicit registration.
    Streaming,
}

impl ServerBackend {
    /// Guess the backend from an adapter's type name.
    ///
    /// Name matching only; prefer configuring the backend explicitly.
    pub fn from_adapter_name(name: &str) -> Self {
        let short = name.rsplit("::").next().unwrap_or(name);
        match short {
            "StreamingAdapter" | "StreamingInstance" => ServerBackend::Streaming,
            _ => ServerBackend::Layered,
        }
    }

    pub fn detect<A: ?Sized>() -> Self {
        Self::from_adapter_name(std::any::type_name::<A>())
    }

    /// Explicit choice, else inference from `adapter_name`, else `Layered`.
    pub fn resolve(explicit: Option<Self>, adapter_name: Option<&str>) -> Self {
        explicit
            .or_else(|| adapter_name.map(Self::from_adapter_name))
            .unwrap_or(ServerBackend::Layered)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServerBackend::Layered => "layered",
            ServerBackend::Streaming => "streaming",
        }
    }
}

impl fmt::Display for ServerBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "layered" => Ok(ServerBackend::Layered),
            "streaming" => Ok(ServerBackend::Streaming),
            _ => Err(()),
        }
    }
}
