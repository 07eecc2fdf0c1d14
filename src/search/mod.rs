pub mod controller;
pub mod debounce;

pub use controller::{
    DEFAULT_QUERY, SEARCH_DEBOUNCE, SearchController, SearchEvent, SearchPhase, SearchState,
    SearchTicket,
};
pub use debounce::{Debouncer, debounce};
