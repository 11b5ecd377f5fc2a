mod chain;
mod channel;
mod factories;
mod initiator;
mod mediator;
mod target;
mod token_network;
