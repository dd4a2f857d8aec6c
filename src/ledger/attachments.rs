// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{Ledger, begin, owned_attachment, owned_transaction};
use crate::error::{LedgerError, LedgerResult};
use crate::files::is_safe_storage_path;
use crate::models::{Attachment, UserId};
use crate::store;
use std::path::Path;

impl Ledger<'_> {
    /// Record a file already inside the attachments root as an unlinked
    /// attachment. `storage_path` is relative to that root.
    pub fn register_attachment(
        &mut self,
        user: UserId,
        storage_path: &str,
    ) -> LedgerResult<Attachment> {
        if !is_safe_storage_path(storage_path) {
            return Err(LedgerError::InvalidStoragePath(storage_path.to_string()));
        }
        let id = store::insert_attachment(self.conn, user, storage_path)?;
        Ok(Attachment {
            id,
            owner_id: user,
            transaction_id: None,
            storage_path: storage_path.to_string(),
        })
    }

    /// Copy `source` into the attachments root and register the copy. The
    /// user's original file is never touched again.
    pub fn attach_file(&mut self, user: UserId, source: &Path) -> LedgerResult<Attachment> {
        let storage_path = self.files.store_file(source)?;
        match self.register_attachment(user, &storage_path) {
            Ok(a) => {
                tracing::info!(attachment_id = a.id, "stored {} as {}", source.display(), storage_path);
                Ok(a)
            }
            Err(e) => {
                if let Err(rm) = self.files.delete_stored_file(&storage_path) {
                    tracing::warn!("could not remove orphaned copy {}: {}", storage_path, rm);
                }
                Err(e)
            }
        }
    }

    /// Link attachments to a transaction, all or nothing.
    ///
    /// Re-linking to the same transaction is a no-op; an attachment linked
    /// elsewhere is rejected with `ALREADY_LINKED`.
    pub fn link_attachments(
        &mut self,
        user: UserId,
        ids: &[i64],
        transaction_id: i64,
    ) -> LedgerResult<Vec<Attachment>> {
        let tx = begin(self.conn)?;
        owned_transaction(&tx, user, transaction_id)?;

        let mut pending = Vec::with_capacity(ids.len());
        for &id in ids {
            let a = owned_attachment(&tx, user, id)?;
            match a.transaction_id {
                Some(linked) if linked != transaction_id => {
                    return Err(LedgerError::AlreadyLinked {
                        attachment_id: id,
                        transaction_id: linked,
                    });
                }
                _ => pending.push(a),
            }
        }
        for a in pending.iter_mut() {
            if a.transaction_id.is_none() {
                store::set_attachment_transaction(&tx, a.id, Some(transaction_id))?;
                a.transaction_id = Some(transaction_id);
            }
        }
        tx.commit()?;
        tracing::info!(transaction_id, "linked {} attachments", pending.len());
        Ok(pending)
    }

    pub fn unlink_attachment(&mut self, user: UserId, id: i64) -> LedgerResult<Attachment> {
        let mut a = owned_attachment(self.conn, user, id)?;
        store::set_attachment_transaction(self.conn, a.id, None)?;
        a.transaction_id = None;
        Ok(a)
    }

    pub fn attachments_for(
        &self,
        user: UserId,
        transaction_id: i64,
    ) -> LedgerResult<Vec<Attachment>> {
        owned_transaction(self.conn, user, transaction_id)?;
        Ok(store::attachments_of(self.conn, transaction_id)?)
    }

    pub fn list_attachments(&self, user: UserId) -> LedgerResult<Vec<Attachment>> {
        Ok(store::list_attachments(self.conn, user)?)
    }
}
