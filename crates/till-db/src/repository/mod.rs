//! # Repository Module
//!
//! Database repository implementations for the register store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Session (till-cli)                                                    │
//! │       │                                                                 │
//! │       │  db.register_state().load_register()                           │
//! │       │  db.register_state().save(&register.snapshot())                │
//! │       ▼                                                                 │
//! │  RegisterStateRepository                                               │
//! │  ├── load(&self)            → Option<StateSnapshot>                    │
//! │  ├── load_register(&self)   → Register                                 │
//! │  └── save(&self, snapshot)  → ()                                       │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  register_slots table                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`register::RegisterStateRepository`] - Whole-state load and save

pub mod register;
