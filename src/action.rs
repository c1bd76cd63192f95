use crate::feeds::{Coordinates, SearchFilters, Tweet};
use crate::ui::widgets::map::AccessToken;

/// Events that flow upward from a panel (or the map surface) to the
/// dashboard. Panels never touch dashboard state directly.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Search {
        query: String,
        filters: SearchFilters,
    },
    /// A card's location badge was activated.
    FocusLocation(Coordinates),
    /// A map marker was activated.
    TweetActivated(Tweet),
    ConfigureMap(AccessToken),
    OpenTokenHelp,
    Refresh,
    Export,
    Quit,
}
