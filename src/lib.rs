pub mod canvas;
pub mod gui;
pub mod logging;
pub mod options;
pub mod remote;
pub mod session;
pub mod settings;
