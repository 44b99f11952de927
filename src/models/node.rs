//! Node and time window types.

use serde::{Deserialize, Serialize};

/// A hard service time window.
///
/// The vehicle must start service no later than `due` and may arrive as
/// early as it likes (it waits until `ready`).
///
/// # Examples
///
/// ```
/// use multitrip::models::TimeWindow;
///
/// let tw = TimeWindow::new(100.0, 200.0).unwrap();
/// assert!(tw.ready() <= tw.due());
/// assert!((tw.waiting_time(80.0) - 20.0).abs() < 1e-10);
/// assert!(tw.is_violated(200.1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    ready: f64,
    due: f64,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// Returns `None` if `ready > due` or either value is non-finite.
    pub fn new(ready: f64, due: f64) -> Option<Self> {
        if !ready.is_finite() || !due.is_finite() || ready > due {
            return None;
        }
        Some(Self { ready, due })
    }

    /// Earliest service start time.
    pub fn ready(&self) -> f64 {
        self.ready
    }

    /// Latest allowable arrival time.
    pub fn due(&self) -> f64 {
        self.due
    }

    /// Waiting time if arriving at the given time (zero when arriving within
    /// or after the window).
    pub fn waiting_time(&self, arrival: f64) -> f64 {
        (self.ready - arrival).max(0.0)
    }

    /// Returns `true` if arriving at the given time violates this window.
    pub fn is_violated(&self, arrival: f64) -> bool {
        arrival > self.due
    }
}

/// A customer or the depot in an MTVRPTW instance.
///
/// Node 0 is the depot (zero demand, window spanning the planning horizon).
/// Nodes are value types compared by id only; routes refer to them by index
/// into the shared [`ProblemData`](super::ProblemData) table.
///
/// # Examples
///
/// ```
/// use multitrip::models::Node;
///
/// let depot = Node::depot(35.0, 35.0, 1000.0);
/// assert_eq!(depot.id(), 0);
/// assert_eq!(depot.demand(), 0);
///
/// let c = Node::new(1, 41.0, 49.0, 10, 0.0, 100.0, 10.0).unwrap();
/// assert_eq!(c.demand(), 10);
/// assert_eq!(c.due_time(), 100.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    id: usize,
    x: f64,
    y: f64,
    demand: u32,
    service_time: f64,
    tw: TimeWindow,
}

impl Node {
    /// Creates a new node.
    ///
    /// Returns `None` if `[ready, due]` is not a valid time window.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        x: f64,
        y: f64,
        demand: u32,
        ready: f64,
        due: f64,
        service_time: f64,
    ) -> Option<Self> {
        let tw = TimeWindow::new(ready, due)?;
        Some(Self {
            id,
            x,
            y,
            demand,
            service_time,
            tw,
        })
    }

    /// Creates the depot: id 0, zero demand, zero service time, window
    /// `[0, horizon]`.
    ///
    /// # Panics
    ///
    /// Panics if `horizon` is negative or non-finite.
    pub fn depot(x: f64, y: f64, horizon: f64) -> Self {
        Self::new(0, x, y, 0, 0.0, horizon, 0.0).expect("horizon must be non-negative")
    }

    /// Node id (0 = depot).
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns `true` if this node is the depot.
    pub fn is_depot(&self) -> bool {
        self.id == 0
    }

    /// X-coordinate.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y-coordinate.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Demand at this node (0 for the depot).
    pub fn demand(&self) -> u32 {
        self.demand
    }

    /// Service duration at this node.
    pub fn service_time(&self) -> f64 {
        self.service_time
    }

    /// Time window constraint.
    pub fn time_window(&self) -> &TimeWindow {
        &self.tw
    }

    /// Earliest service start time.
    pub fn ready_time(&self) -> f64 {
        self.tw.ready()
    }

    /// Latest allowable arrival time.
    pub fn due_time(&self) -> f64 {
        self.tw.due()
    }

    /// Euclidean distance to another node.
    pub fn distance_to(&self, other: &Node) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
