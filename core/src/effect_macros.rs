//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce boilerplate when creating `Effect::Document` and
//! `Effect::Identity` values: they clone the collaborator `Arc`, own the
//! collection name, and box the callbacks.

/// Create an `Effect::Document` with a `ListAll` operation
///
/// # Example
///
/// ```rust,ignore
/// use tasknest_core::list_documents;
///
/// list_documents! {
///     store: env.store,
///     collection: "tasks",
///     on_success: |documents| Some(TaskListAction::Loaded { documents }),
///     on_error: |error| Some(TaskListAction::LoadFailed { error: error.to_string() })
/// }
/// ```
#[macro_export]
macro_rules! list_documents {
    (
        store: $store:expr,
        collection: $collection:expr,
        on_success: |$success_param:pat_param| $success_body:expr,
        on_error: |$error_param:pat_param| $error_body:expr
    ) => {
        $crate::effect::Effect::Document($crate::effect::DocumentOperation::ListAll {
            store: ::std::sync::Arc::clone(&$store),
            collection: ::std::string::ToString::to_string(&$collection),
            on_success: ::std::boxed::Box::new(move |$success_param| $success_body),
            on_error: ::std::boxed::Box::new(move |$error_param| $error_body),
        })
    };
}

/// Create an `Effect::Document` with a `Set` operation
///
/// # Example
///
/// ```rust,ignore
/// use tasknest_core::set_document;
///
/// set_document! {
///     store: env.store,
///     collection: "tasks",
///     id: task_id,
///     document: document,
///     on_success: || Some(TaskListAction::TaskAdded { task }),
///     on_error: |error| Some(TaskListAction::WriteFailed { error: error.to_string() })
/// }
/// ```
#[macro_export]
macro_rules! set_document {
    (
        store: $store:expr,
        collection: $collection:expr,
        id: $id:expr,
        document: $document:expr,
        on_success: || $success_body:expr,
        on_error: |$error_param:pat_param| $error_body:expr
    ) => {
        $crate::effect::Effect::Document($crate::effect::DocumentOperation::Set {
            store: ::std::sync::Arc::clone(&$store),
            collection: ::std::string::ToString::to_string(&$collection),
            id: $id,
            document: $document,
            on_success: ::std::boxed::Box::new(move |()| $success_body),
            on_error: ::std::boxed::Box::new(move |$error_param| $error_body),
        })
    };
}

/// Create an `Effect::Document` with a `Delete` operation
///
/// # Example
///
/// ```rust,ignore
/// use tasknest_core::delete_document;
///
/// delete_document! {
///     store: env.store,
///     collection: "tasks",
///     id: task_id.clone(),
///     on_success: || Some(TaskListAction::TaskDeleted { id: task_id }),
///     on_error: |error| Some(TaskListAction::WriteFailed { error: error.to_string() })
/// }
/// ```
#[macro_export]
macro_rules! delete_document {
    (
        store: $store:expr,
        collection: $collection:expr,
        id: $id:expr,
        on_success: || $success_body:expr,
        on_error: |$error_param:pat_param| $error_body:expr
    ) => {
        $crate::effect::Effect::Document($crate::effect::DocumentOperation::Delete {
            store: ::std::sync::Arc::clone(&$store),
            collection: ::std::string::ToString::to_string(&$collection),
            id: $id,
            on_success: ::std::boxed::Box::new(move |()| $success_body),
            on_error: ::std::boxed::Box::new(move |$error_param| $error_body),
        })
    };
}
