use crate::router::pattern::DEFAULT_CAPTURE_MARKER;
use crate::router::{ActionRegistry, Bindings, Command, Pattern};
use eyre::Result;
use log::debug;
use std::fmt;

/// No route accepted a command.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    #[error("no route matches `{}`", .argv.join(" "))]
    NoMatch { argv: Vec<String> },

    #[error("route `{pattern}` names unknown action `{action}`")]
    UnknownAction { pattern: String, action: String },
}

pub type InlineHandler<C, T> = Box<dyn Fn(&C) -> Result<T>>;

pub enum Target<C, T> {
    /// Resolved through the action registry; called with the bindings.
    Action(String),
    /// Called with the command alone.
    Inline(InlineHandler<C, T>),
}

impl<C, T> fmt::Debug for Target<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Action(action) => write!(f, "Action({})", action),
            Target::Inline(_) => write!(f, "Inline(..)"),
        }
    }
}

/// One registered pattern and what it dispatches to.
#[derive(Debug)]
pub struct Route<C, T> {
    pattern: Pattern,
    target:  Target<C, T>,
}

impl<C, T> Route<C, T> {
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn target(&self) -> &Target<C, T> {
        &self.target
    }

    /// The action identifier, or `<inline>`.
    pub fn label(&self) -> &str {
        match &self.target {
            Target::Action(action) => action.as_str(),
            Target::Inline(_) => "<inline>",
        }
    }
}

/// Ordered routing table over an action registry. The first matching route wins.
///
/// # Example
///
/// ```
/// use cmdform::router::{ActionTable, Argv, Router};
///
/// let actions = ActionTable::new()
///     .register("loadbalancers#show", |_: &Argv, bindings| Ok(bindings["id"].clone()));
///
/// let mut router = Router::new(actions);
/// router.route("show loadbalancer :id", "loadbalancers#show");
///
/// let id = router.call(&Argv::parse("show loadbalancer 6")).unwrap();
/// assert_eq!(id, "6");
/// ```
pub struct Router<C, T, R> {
    actions: R,
    routes:  Vec<Route<C, T>>,
    marker:  char,
}

impl<C, T, R> Router<C, T, R>
where
    C: Command,
    R: ActionRegistry<C, T>,
{
    pub fn new(actions: R) -> Self {
        Self {
            actions,
            routes: Vec::new(),
            marker: DEFAULT_CAPTURE_MARKER,
        }
    }

    /// Changes the marker for captures in routes registered afterwards.
    pub fn with_capture_marker(mut self, marker: char) -> Self {
        self.marker = marker;
        self
    }

    /// Appends a route from a whitespace-separated pattern to an action identifier.
    pub fn route(&mut self, pattern: &str, action: &str) -> &mut Self {
        let pattern = Pattern::parse(pattern, self.marker);
        debug!("route `{}` => {}", pattern, action);
        self.routes.push(Route {
            pattern,
            target: Target::Action(action.to_string()),
        });
        self
    }

    /// Appends a route whose pattern is the literal words of `name`.
    pub fn inline<F>(&mut self, name: &str, handler: F) -> &mut Self
    where
        F: Fn(&C) -> Result<T> + 'static,
    {
        debug!("route `{}` => <inline>", name);
        self.routes.push(Route {
            pattern: Pattern::literal(name),
            target:  Target::Inline(Box::new(handler)),
        });
        self
    }

    pub fn routes(&self) -> &[Route<C, T>] {
        &self.routes
    }

    pub fn actions(&self) -> &R {
        &self.actions
    }

    /// Finds the first route accepting `argv`, without dispatching.
    pub fn recognize(&self, argv: &[String]) -> Option<(&Route<C, T>, Bindings)> {
        self.routes
            .iter()
            .find_map(|route| route.pattern.matches(argv).map(|bindings| (route, bindings)))
    }

    /// Dispatches `command` to the first matching route.
    ///
    /// Fails with [`RoutingError`] when nothing matches; errors from the
    /// handler itself are returned as they are.
    pub fn call(&self, command: &C) -> Result<T> {
        let argv = command.argv();
        let (route, bindings) = self.recognize(argv).ok_or_else(|| RoutingError::NoMatch {
            argv: argv.to_vec(),
        })?;
        debug!("`{}` matched `{}` with {:?}", argv.join(" "), route.pattern, bindings);

        match &route.target {
            Target::Action(action) => {
                let handler = self.actions.resolve(action).ok_or_else(|| RoutingError::UnknownAction {
                    pattern: route.pattern.to_string(),
                    action:  action.clone(),
                })?;
                handler(command, &bindings)
            }
            Target::Inline(handler) => handler(command),
        }
    }
}
