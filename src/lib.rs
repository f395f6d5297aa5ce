pub mod app;
pub mod net;
pub mod queue;
pub mod sim;
pub mod topo;
pub mod trace;

#[cfg(test)]
mod test;
