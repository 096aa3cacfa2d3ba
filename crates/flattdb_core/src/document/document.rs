//! In-memory documents.

use super::{DocumentId, DocumentRecord, RelationalId};
use crate::collection::Collection;
use crate::error::{CoreError, CoreResult};
use flattdb_codec::{Fields, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// A document of a collection, with its related documents attached.
///
/// Documents come from [`Collection::create`] or [`Collection::fetch`].
/// Changes stay in memory until [`Document::save`].
///
/// Related documents are owned copies: setting a relation and then
/// changing the original does not change the copy held here.
#[derive(Clone)]
pub struct Document {
    id: DocumentId,
    collection: Arc<Collection>,
    fields: Fields,
    related: BTreeMap<String, Document>,
}

impl Document {
    pub(crate) fn new(id: DocumentId, collection: Arc<Collection>) -> Self {
        Self {
            id,
            collection,
            fields: Fields::new(),
            related: BTreeMap::new(),
        }
    }

    /// The document id.
    #[must_use]
    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    /// The `collection:id` reference to this document.
    #[must_use]
    pub fn relational_id(&self) -> RelationalId {
        RelationalId::new(self.collection.name(), self.id.clone())
    }

    /// The owning collection.
    #[must_use]
    pub fn collection(&self) -> &Arc<Collection> {
        &self.collection
    }

    /// Name of the model the owning collection resolved.
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.collection.model_name()
    }

    /// Returns a field value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Sets a field, replacing any previous value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Removes a field, returning its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// All field data.
    #[must_use]
    pub fn get_all(&self) -> &Fields {
        &self.fields
    }

    /// Replaces all field data.
    pub fn set_all(&mut self, fields: Fields) {
        self.fields = fields;
    }

    /// Attaches `document` under relation `name`, replacing any previous
    /// one.
    pub fn set_related(&mut self, name: impl Into<String>, document: Document) {
        self.related.insert(name.into(), document);
    }

    /// The document related under `name`.
    ///
    /// # Errors
    ///
    /// Returns `RelationNotFound` if no such relation is set.
    pub fn get_related(&self, name: &str) -> CoreResult<&Document> {
        self.related
            .get(name)
            .ok_or_else(|| self.relation_not_found(name))
    }

    /// Mutable access to the document related under `name`.
    ///
    /// # Errors
    ///
    /// Returns `RelationNotFound` if no such relation is set.
    pub fn get_related_mut(&mut self, name: &str) -> CoreResult<&mut Document> {
        let missing = self.relation_not_found(name);
        self.related.get_mut(name).ok_or(missing)
    }

    /// Checks if a relation is set.
    #[must_use]
    pub fn has_related(&self, name: &str) -> bool {
        self.related.contains_key(name)
    }

    /// Detaches the relation `name`.
    pub fn remove_related(&mut self, name: &str) -> Option<Document> {
        self.related.remove(name)
    }

    /// Iterates over relations in name order.
    pub fn related(&self) -> impl Iterator<Item = (&str, &Document)> {
        self.related.iter().map(|(name, doc)| (name.as_str(), doc))
    }

    /// The record this document is stored as.
    #[must_use]
    pub fn to_record(&self) -> DocumentRecord {
        DocumentRecord {
            related: self
                .related
                .iter()
                .map(|(name, doc)| (name.clone(), doc.relational_id().to_string()))
                .collect(),
            data: self.fields.clone(),
        }
    }

    /// Persists this document and, first, every related document.
    ///
    /// Steps, in order:
    /// 1. Every document in the relation tree is checked for cycles and
    ///    non-finite numbers, then validated by its collection's model.
    ///    Copies of one document reached through several relations must be
    ///    equal. Nothing is written if any check fails.
    /// 2. Related documents are saved depth first. A document reachable
    ///    through several relations is saved once.
    /// 3. This document's resource is written.
    /// 4. Every non-relation index of the collection is updated.
    ///
    /// A failure in steps 2 to 4 leaves whatever was already written in
    /// place; `Collection::rebuild_indexes` restores index consistency.
    ///
    /// # Errors
    ///
    /// Returns `RelationCycle`, `ConflictingCopies`, a model's validation
    /// error, or the first storage or codec error encountered.
    pub fn save(&self) -> CoreResult<()> {
        self.check(&mut Vec::new(), &mut HashMap::new())?;
        let mut saved = HashSet::new();
        self.save_tree(&mut saved)?;
        debug!(
            collection = %self.collection.name(),
            id = %self.id,
            documents = saved.len(),
            "saved document"
        );
        Ok(())
    }

    fn check<'a>(
        &'a self,
        path: &mut Vec<RelationalId>,
        seen: &mut HashMap<RelationalId, &'a Document>,
    ) -> CoreResult<()> {
        let relational_id = self.relational_id();
        if path.contains(&relational_id) {
            return Err(CoreError::RelationCycle {
                relational_id: relational_id.to_string(),
            });
        }
        if let Some(first) = seen.get(&relational_id) {
            if *first != self {
                return Err(CoreError::ConflictingCopies {
                    relational_id: relational_id.to_string(),
                });
            }
            return Ok(());
        }
        if let Some((field, _)) = self.fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(CoreError::invalid_document(
                self.id.as_str(),
                format!("field \"{field}\" holds a non-finite number"),
            ));
        }
        self.collection.model().validate(self)?;
        seen.insert(relational_id.clone(), self);

        path.push(relational_id);
        for document in self.related.values() {
            document.check(path, seen)?;
        }
        path.pop();
        Ok(())
    }

    fn save_tree(&self, saved: &mut HashSet<RelationalId>) -> CoreResult<()> {
        if !saved.insert(self.relational_id()) {
            trace!(id = %self.id, "already saved in this cascade");
            return Ok(());
        }
        for document in self.related.values() {
            document.save_tree(saved)?;
        }
        self.collection.write_document(self)?;
        self.collection.update_indexes(self)
    }

    fn relation_not_found(&self, name: &str) -> CoreError {
        CoreError::RelationNotFound {
            id: self.id.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("collection", &self.collection.name())
            .field("fields", &self.fields)
            .field("related", &self.related)
            .finish()
    }
}

impl PartialEq for Document {
    /// Documents are equal when they name the same stored document and
    /// hold the same data and relations.
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.collection.name() == other.collection.name()
            && self.fields == other.fields
            && self.related == other.related
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::CollectionConfig;
    use crate::config::Config;
    use crate::database::Database;
    use crate::index::IndexKind;
    use crate::model::DocumentModel;
    use flattdb_storage::InMemoryBackend;

    struct Member;

    impl DocumentModel for Member {
        fn name(&self) -> &str {
            "member"
        }

        fn on_create(&self, document: &mut Document) {
            document.set("tags", vec!["member"]);
        }

        fn validate(&self, document: &Document) -> CoreResult<()> {
            match document.get("name").and_then(Value::as_text) {
                Some(_) => Ok(()),
                None => Err(CoreError::invalid_document(
                    document.id().as_str(),
                    "name is required",
                )),
            }
        }
    }

    fn open() -> (Arc<Database>, Arc<Collection>, Arc<Collection>) {
        let config = Config::new().with_model(Member);
        let db = Database::open_with_backend(config, Arc::new(InMemoryBackend::new())).unwrap();
        let users = db
            .create_collection("users", &CollectionConfig::new().model("member"))
            .unwrap();
        let posts = db
            .create_collection(
                "posts",
                &CollectionConfig::new()
                    .index("title", &IndexKind::Unique)
                    .index("author", &IndexKind::Collection("users".into())),
            )
            .unwrap();
        (db, users, posts)
    }

    #[test]
    fn field_access() {
        let (_db, _users, posts) = open();
        let mut doc = posts.create();

        assert_eq!(doc.get("title"), None);
        doc.set("title", "Hello");
        doc.set("views", 3);
        assert_eq!(doc.get("title"), Some(&Value::from("Hello")));
        assert_eq!(doc.remove("views"), Some(Value::Integer(3)));
        assert_eq!(doc.get_all().len(), 1);

        doc.set_all(Fields::from([("other".to_string(), Value::Bool(false))]));
        assert_eq!(doc.get("title"), None);
        assert_eq!(doc.get("other"), Some(&Value::Bool(false)));
        assert_eq!(doc.model_name(), "default");
    }

    #[test]
    fn on_create_initializes() {
        let (_db, users, _posts) = open();
        let doc = users.create();

        assert_eq!(doc.model_name(), "member");
        assert_eq!(doc.get("tags"), Some(&Value::from(vec!["member"])));
    }

    #[test]
    fn unset_relation_is_lookup_error() {
        let (_db, _users, posts) = open();
        let mut doc = posts.create();

        assert!(!doc.has_related("author"));
        assert!(matches!(
            doc.get_related("author"),
            Err(CoreError::RelationNotFound { .. })
        ));
        assert!(doc.get_related_mut("author").is_err());
        assert!(doc.remove_related("author").is_none());
    }

    #[test]
    fn save_cascades_to_related() {
        let (db, users, posts) = open();

        let mut author = users.create();
        author.set("name", "alice");
        let mut post = posts.create();
        post.set("title", "Hello");
        post.set_related("author", author.clone());
        post.save().unwrap();

        assert!(users.exists(author.id()));
        assert_eq!(
            users.query("name", "alice").unwrap().into_first().unwrap().id(),
            author.id()
        );

        let record = posts.read_record(post.id()).unwrap();
        assert_eq!(
            record.related.get("author"),
            Some(&format!("users:{}", author.id()))
        );
        drop(db);
    }

    #[test]
    fn related_edits_are_saved() {
        let (_db, users, posts) = open();

        let mut author = users.create();
        author.set("name", "alice");
        let mut post = posts.create();
        post.set_related("author", author);
        post.get_related_mut("author").unwrap().set("name", "alicia");
        post.save().unwrap();

        let author_id = post.get_related("author").unwrap().id().clone();
        let stored = users.fetch(&author_id).unwrap();
        assert_eq!(stored.get("name"), Some(&Value::from("alicia")));
        let names: Vec<_> = post.related().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["author"]);
    }

    #[test]
    fn shared_related_document_saved_once() {
        let (_db, users, _posts) = open();

        let mut friend = users.create();
        friend.set("name", "bob");
        let mut left = users.create();
        left.set("name", "left");
        left.set_related("friend", friend.clone());
        let mut root = users.create();
        root.set("name", "root");
        root.set_related("left", left);
        root.set_related("friend", friend);
        root.save().unwrap();

        assert_eq!(users.count().unwrap(), 3);
    }

    #[test]
    fn diverging_copies_abort_before_writing() {
        let (_db, users, _posts) = open();

        let mut friend = users.create();
        friend.set("name", "bob");
        let mut renamed = friend.clone();
        renamed.set("name", "robert");
        let mut left = users.create();
        left.set("name", "left");
        left.set_related("friend", renamed);
        let mut root = users.create();
        root.set("name", "root");
        root.set_related("friend", friend.clone());
        root.set_related("left", left);

        assert!(matches!(
            root.save(),
            Err(CoreError::ConflictingCopies { .. })
        ));
        assert_eq!(users.count().unwrap(), 0);
        assert!(!users.exists(friend.id()));
        assert!(users.query("name", "robert").unwrap().is_empty());
    }

    #[test]
    fn cycle_aborts_before_writing() {
        let (_db, users, _posts) = open();

        let mut a = users.create();
        a.set("name", "a");
        let mut b = users.create();
        b.set("name", "b");
        b.set_related("back", a.clone());
        a.set_related("next", b);

        assert!(matches!(a.save(), Err(CoreError::RelationCycle { .. })));
        assert_eq!(users.count().unwrap(), 0);
    }

    #[test]
    fn invalid_related_document_aborts_save() {
        let (_db, users, posts) = open();

        let author = users.create();
        let mut post = posts.create();
        post.set("title", "Hello");
        post.set_related("author", author);

        assert!(matches!(
            post.save(),
            Err(CoreError::InvalidDocument { .. })
        ));
        assert_eq!(posts.count().unwrap(), 0);
        assert_eq!(users.count().unwrap(), 0);
        assert!(posts.query("title", "Hello").unwrap().is_empty());
    }

    #[test]
    fn non_finite_related_field_aborts_save() {
        let (_db, users, posts) = open();

        let mut author = users.create();
        author.set("name", "alice");
        author.set("score", f64::NAN);
        let mut post = posts.create();
        post.set("title", "Hello");
        post.set_related("author", author);

        assert!(matches!(
            post.save(),
            Err(CoreError::InvalidDocument { .. })
        ));
        assert_eq!(posts.count().unwrap(), 0);
        assert_eq!(users.count().unwrap(), 0);
    }

    #[test]
    fn to_record_uses_relational_ids() {
        let (_db, users, posts) = open();

        let author = users.create();
        let mut post = posts.create();
        post.set("title", "t");
        post.set_related("author", author.clone());

        let record = post.to_record();
        assert_eq!(record.related["author"], author.relational_id().to_string());
        assert_eq!(record.data["title"], Value::from("t"));
    }
}
