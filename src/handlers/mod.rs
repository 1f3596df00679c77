// Handlers are split by security tier:
// public (no auth) and protected (JWT with granted roles).
pub mod protected;
pub mod public;
