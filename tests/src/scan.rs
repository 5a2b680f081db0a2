mod integration;
mod simulated;
