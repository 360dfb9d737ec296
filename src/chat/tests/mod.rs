mod helpers;
mod turn_flow;
