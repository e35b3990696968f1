pub mod config;
pub mod driver;
pub mod selector;

pub use config::Config;
pub use driver::{
    BoundingBox, BrowserDriver, ClickOptions, DialogInfo, DialogKind, DialogResponse,
    ElementProbe, MouseAction, MouseButton, ReadyState,
};
pub use selector::{Selector, SelectorPart};
