// Two-tier handler layout:
// Public (no gate, /auth/*) -> Protected (gated, everything else)
pub mod protected;
pub mod public;
