/*!
An educational blockchain tycoon game, as a library.

A player grows a campus of miners, validators, smart contract hubs and
research labs, runs consensus rounds and deploys smart contracts. The whole
game is a pure [`reduce`](reducer::reduce) function over a [`GameState`]
driven by [`Action`]s; [`Game`] wraps it with rules, consensus engines, a
seedable random source and a clock, and [`Session`] runs a game on the Tokio
runtime with a periodic tick.

[`GameState`]: state::GameState
[`Action`]: action::Action
[`Game`]: game::Game
[`Session`]: session::Session
*/

pub mod action;
pub mod activity;
pub mod autoplay;
pub mod campus;
pub mod chain;
pub mod clock;
pub mod consensus;
pub mod game;
pub mod mining;
pub mod node;
pub mod prelude;
pub mod reducer;
pub mod resources;
pub mod rules;
pub mod session;
pub mod state;
pub mod tutorial;
