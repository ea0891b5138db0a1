//! Interactive front-ends. Implement InputPort.

pub mod console;

pub use console::ConsoleInputPort;
