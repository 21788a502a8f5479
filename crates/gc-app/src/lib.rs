/// glyphcam application layer: CLI, session, live loop, exports.

pub mod canvas;
pub mod cli;
pub mod export;
pub mod fps;
pub mod hotreload;
pub mod live;
pub mod paint;
pub mod session;
