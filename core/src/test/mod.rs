//! Integration tests comparing every operation against a high-precision
//! arpfloat reference, plus cross-operation properties (flag stickiness,
//! remainder identities, partial-reduction termination).
