//! Named views and navigation between them.
//!
//! Paths follow the dashboard's route table: `patients`,
//! `patient/{dni}`, `departments`, `profile`, `help` and `error-page`.
//! The empty path redirects to `patients`; anything unknown lands on
//! `error-page`.

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Route {
    #[default]
    Patients,
    PatientDetail(String),
    Departments,
    Profile,
    Help,
    ErrorPage,
}

impl Route {
    /// Resolve a path (leading/trailing slashes optional).
    pub fn parse(path: &str) -> Self {
        let path = path.trim().trim_matches('/');
        let mut segments = path.split('/');

        match (segments.next(), segments.next(), segments.next()) {
            (Some(""), None, None) | (Some("patients"), None, None) => Route::Patients,
            (Some("patient"), Some(dni), None) if !dni.trim().is_empty() => {
                Route::PatientDetail(dni.trim().to_string())
            }
            (Some("departments"), None, None) => Route::Departments,
            (Some("profile"), None, None) => Route::Profile,
            (Some("help"), None, None) => Route::Help,
            _ => Route::ErrorPage,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Patients => "/patients".to_string(),
            Route::PatientDetail(dni) => format!("/patient/{}", dni),
            Route::Departments => "/departments".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::Help => "/help".to_string(),
            Route::ErrorPage => "/error-page".to_string(),
        }
    }

    /// Get the display title for this view.
    pub fn title(&self) -> &'static str {
        match self {
            Route::Patients => "Patients",
            Route::PatientDetail(_) => "Patient record",
            Route::Departments => "Departments",
            Route::Profile => "Profile",
            Route::Help => "Help",
            Route::ErrorPage => "Not found",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Current route plus the trail that led to it.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    current: Route,
    history: Vec<Route>,
}

impl Navigator {
    pub fn new(start: Route) -> Self {
        Self {
            current: start,
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> &Route {
        &self.current
    }

    /// Go to `route`. Returns the route that was left, or `None` when
    /// already there.
    pub fn navigate(&mut self, route: Route) -> Option<Route> {
        if route == self.current {
            return None;
        }
        let previous = std::mem::replace(&mut self.current, route);
        self.history.push(previous.clone());
        Some(previous)
    }

    pub fn navigate_path(&mut self, path: &str) -> Option<Route> {
        self.navigate(Route::parse(path))
    }

    /// Return to the previous view; the patient list when there is none.
    /// Returns the route that was left, or `None` when nothing changed.
    pub fn back(&mut self) -> Option<Route> {
        let target = self.history.pop().unwrap_or(Route::Patients);
        if target == self.current {
            return None;
        }
        Some(std::mem::replace(&mut self.current, target))
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty() || self.current != Route::Patients
    }
}
