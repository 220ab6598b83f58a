//! One generation cycle, from the route table to the published collection.
//!
//! # Overview
//!
//! [`Generator::run`] performs, in order:
//!
//! 1. list routes from the [`RouteSource`] and [`assemble`] a fresh document,
//! 2. resolve the prior document: the remote collection (by configured id, or
//!    by collection name), else the local file,
//! 3. [`Reconciler::reconcile`] the two,
//! 4. save the result locally,
//! 5. publish it: update the known remote collection or create a new one.
//!
//! A prior document that cannot be read is logged and treated as absent. Any
//! other failure ends the cycle before the following steps run.

use std::path::PathBuf;

use courier_core::Document;

use crate::assembler::assemble;
use crate::config::CourierConfig;
use crate::error::CourierResult;
use crate::reconcile::Reconciler;
use crate::source::{RouteSource, RuleSource};
use crate::store::{LocalStore, RemoteStore};

/// Outcome of one [`Generator::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub document: Document,
    pub saved_to: PathBuf,
    /// Remote collection the document was published to
    pub remote_id: Option<String>,
    /// Whether a prior document was merged in
    pub merged: bool,
}

pub struct Generator<'a> {
    config: &'a CourierConfig,
    routes: &'a dyn RouteSource,
    rules: &'a dyn RuleSource,
    local: &'a dyn LocalStore,
    remote: Option<&'a dyn RemoteStore>,
}

impl<'a> Generator<'a> {
    pub fn new(
        config: &'a CourierConfig,
        routes: &'a dyn RouteSource,
        rules: &'a dyn RuleSource,
        local: &'a dyn LocalStore,
    ) -> Self {
        Self {
            config,
            routes,
            rules,
            local,
            remote: None,
        }
    }

    /// Publish through `remote`; only used when `remote.enabled` is set.
    #[must_use]
    pub fn with_remote(mut self, remote: &'a dyn RemoteStore) -> Self {
        self.remote = Some(remote);
        self
    }

    fn remote(&self) -> Option<&'a dyn RemoteStore> {
        self.remote.filter(|_| self.config.remote.enabled)
    }

    pub fn run(&self) -> CourierResult<CycleReport> {
        let routes = self.routes.list_routes()?;
        let fresh = assemble(&routes, self.rules, self.config);

        let (prior, known_id) = self.resolve_prior();
        let merged = prior.is_some() && self.config.merge.enabled;
        let document = Reconciler::new(&self.config.merge).reconcile(fresh, prior.as_ref());

        let saved_to = self.local.save(&document)?;
        let remote_id = self.publish(&document, known_id)?;

        tracing::info!(
            requests = document.request_count(),
            merged,
            remote_id = remote_id.as_deref().unwrap_or("-"),
            "generation cycle complete"
        );
        Ok(CycleReport {
            document,
            saved_to,
            remote_id,
            merged,
        })
    }

    /// Prior document and the remote id to publish to.
    fn resolve_prior(&self) -> (Option<Document>, Option<String>) {
        if let Some(remote) = self.remote() {
            let id = self
                .config
                .remote
                .collection_id
                .clone()
                .or_else(|| self.find_by_name(remote));
            if let Some(id) = id {
                match remote.fetch(&id) {
                    Ok(Some(document)) => return (Some(document), Some(id)),
                    Ok(None) => {
                        tracing::warn!(id = %id, "remote collection not found, publishing a new one");
                    }
                    Err(error) => {
                        tracing::warn!(id = %id, %error, "could not fetch remote collection");
                        return (self.load_local(), Some(id));
                    }
                }
            }
        }
        (self.load_local(), None)
    }

    fn find_by_name(&self, remote: &dyn RemoteStore) -> Option<String> {
        let name = &self.config.collection.name;
        match remote.list() {
            Ok(entries) => entries.into_iter().find(|e| &e.name == name).map(|e| e.id),
            Err(error) => {
                tracing::warn!(%error, "could not list remote collections");
                None
            }
        }
    }

    fn load_local(&self) -> Option<Document> {
        self.local.load().unwrap_or_else(|error| {
            tracing::warn!(%error, "could not read local collection, generating from scratch");
            None
        })
    }

    fn publish(&self, document: &Document, known_id: Option<String>) -> CourierResult<Option<String>> {
        let Some(remote) = self.remote() else {
            return Ok(None);
        };
        match known_id {
            Some(id) => {
                remote.update(&id, document)?;
                Ok(Some(id))
            }
            None => remote.create(document).map(Some),
        }
    }
}
