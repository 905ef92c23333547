//! Routes, back stack and side drawer.

/// Screens reachable in the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    ContactList,
    AddContact,
}

impl Route {
    pub const START: Route = Route::ContactList;

    /// Stable route path used by the host navigator.
    pub fn path(self) -> &'static str {
        match self {
            Self::ContactList => "contact_list",
            Self::AddContact => "add_contact",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "contact_list" => Some(Self::ContactList),
            "add_contact" => Some(Self::AddContact),
            _ => None,
        }
    }

    /// Top app bar title.
    pub fn title(self) -> &'static str {
        match self {
            Self::ContactList => "Contacts App",
            Self::AddContact => "Add New Contact",
        }
    }
}

/// Back stack rooted at `Route::START`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    stack: Vec<Route>,
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            stack: vec![Route::START],
        }
    }

    pub fn current(&self) -> Route {
        self.stack.last().copied().unwrap_or(Route::START)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Pushes `route`. Navigating to the route already on top is ignored.
    pub fn navigate(&mut self, route: Route) {
        if self.current() != route {
            self.stack.push(route);
        }
    }

    /// Pops one screen. The start destination is never popped.
    pub fn pop_back(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }
        self.stack.pop();
        true
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

/// Entries shown in the side drawer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawerItem {
    Home,
    Settings,
    About,
}

impl DrawerItem {
    pub const ALL: [DrawerItem; 3] = [DrawerItem::Home, DrawerItem::Settings, DrawerItem::About];

    pub fn label(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Settings => "Settings",
            Self::About => "About",
        }
    }
}

/// Side drawer, closed by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Drawer {
    open: bool,
}

impl Drawer {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn items(&self) -> &'static [DrawerItem] {
        &DrawerItem::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::{Drawer, DrawerItem, Navigator, Route};

    #[test]
    fn route_paths_round_trip() {
        for route in [Route::ContactList, Route::AddContact] {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
        assert_eq!(Route::from_path("settings"), None);
    }

    #[test]
    fn navigator_never_pops_start_destination() {
        let mut nav = Navigator::new();
        assert!(!nav.pop_back());
        assert_eq!(nav.current(), Route::ContactList);

        nav.navigate(Route::AddContact);
        nav.navigate(Route::AddContact);
        assert_eq!(nav.depth(), 2);
        assert_eq!(nav.current().title(), "Add New Contact");

        assert!(nav.pop_back());
        assert_eq!(nav.current(), Route::ContactList);
    }

    #[test]
    fn drawer_lists_fixed_items() {
        let mut drawer = Drawer::default();
        assert!(!drawer.is_open());
        drawer.open();
        assert!(drawer.is_open());

        let labels: Vec<_> = drawer.items().iter().map(|item| item.label()).collect();
        assert_eq!(labels, vec!["Home", "Settings", "About"]);
        assert_eq!(drawer.items()[0], DrawerItem::Home);
    }
}
