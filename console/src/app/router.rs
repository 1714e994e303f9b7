//! Screen routing
//!
//! Every screen the shell can show, with its access requirement. The
//! guard is the single place deciding where an unauthenticated operator
//! may go.

/// All console screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    Devices,
    Deploy,
    Security,
    Scripts,
    Status,
    Metrics,
    History,
    Logs,
}

impl Route {
    /// Screens reachable without a session
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Login)
    }

    /// Sidebar title
    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Dashboard => "Dashboard",
            Route::Devices => "Devices",
            Route::Deploy => "Deploy Config",
            Route::Security => "Security",
            Route::Scripts => "Scripts",
            Route::Status => "Connection Status",
            Route::Metrics => "Device Metrics",
            Route::History => "Config History",
            Route::Logs => "Activity Logs",
        }
    }

    /// All operator-facing screens, in sidebar order
    pub fn sidebar() -> &'static [Route] {
        &[
            Route::Dashboard,
            Route::Devices,
            Route::Deploy,
            Route::Security,
            Route::Scripts,
            Route::Status,
            Route::Metrics,
            Route::History,
            Route::Logs,
        ]
    }
}

/// Resolve a requested route against the session phase. Unauthenticated
/// requests for protected screens land on the login screen.
pub fn guard(requested: Route, authenticated: bool) -> Route {
    if requested.requires_auth() && !authenticated {
        return Route::Login;
    }
    // A logged-in operator asking for the login screen goes home instead
    if requested == Route::Login && authenticated {
        return Route::Dashboard;
    }
    requested
}
