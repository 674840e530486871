pub mod dehaze_session;

pub use dehaze_session::DehazeSession;
