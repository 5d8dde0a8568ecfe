#![doc = "netlify-deploy-core: core logic library for netlify-deploy."]

//! This crate contains the deploy pipeline without any HTTP client or terminal I/O:
//! the data model and collaborator traits, the file collector, and the orchestrator
//! that creates a site, builds, uploads and waits for the deploy to go live.
//!
//! # Usage
//! Implement [`contract::HostingApi`] for a provider client, then drive a
//! [`deploy::Deployer`] with it, a [`build_step::CommandBuildRunner`] and a
//! [`deploy::TokioSleeper`].

pub mod build_step;
pub mod collect;
pub mod contract;
pub mod deploy;
pub mod error;

pub use error::DeployError;
