use std::fmt;

/// Diagnostics channel id.
///
/// Each audit run pushes into its own ticket. [`Ticket::ALL`] and
/// [`Ticket::LAST`] are selectors, not channels: `ALL` reads every channel
/// and `LAST` the one most recently pushed to.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Ticket(u32);

impl Ticket {
    pub const ALL: Ticket = Ticket(0);
    pub const CONVERT: Ticket = Ticket(1);
    pub const PARSE: Ticket = Ticket(2);
    pub const LAST: Ticket = Ticket(u32::MAX);

    pub const fn new(raw: u32) -> Self {
        Ticket(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// `ALL` or `LAST`.
    pub const fn is_selector(self) -> bool {
        self.0 == Self::ALL.0 || self.0 == Self::LAST.0
    }
}

impl fmt::Debug for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Ticket::ALL => write!(f, "Ticket::ALL"),
            Ticket::LAST => write!(f, "Ticket::LAST"),
            Ticket::CONVERT => write!(f, "Ticket::CONVERT"),
            Ticket::PARSE => write!(f, "Ticket::PARSE"),
            Ticket(raw) => write!(f, "Ticket({raw})"),
        }
    }
}
