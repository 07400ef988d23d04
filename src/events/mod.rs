pub mod control;
pub mod layout;
pub mod window;

pub use control::ControlEvent;
pub use layout::LayoutCode;
pub use window::WindowInfo;
