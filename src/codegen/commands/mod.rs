//! One executor per DSL command, dispatched exhaustively over
//! [`Statement`].
//!
//! Input-emptiness checks are the explicit [`guard_empty_input`] helper;
//! output cleanup is [`crate::display::Display::table`]'s built-in
//! dedup/empty-row pass, both called directly from the executors that
//! need them. Temporary view cleanup (prefetch's scratch views, `FIND`'s
//! intermediate views) uses the RAII [`TempViewGuard`].

mod apply;
mod disp;
mod find;
mod get;
mod group;
mod info;
mod join;
mod merge;
mod new_load;
mod save;
mod sort;

use crate::display::Display;
use crate::error::{KestrelError, Result};
use crate::session::Session;
use crate::statement::Statement;
use crate::store::Store;
use crate::symboltable::VarStruct;

pub fn execute(session: &mut Session, stmt: &Statement) -> Result<Option<Display>> {
    match stmt {
        Statement::New { output, type_, data } => {
            new_load::new(session, output, type_.as_deref(), data)?;
            Ok(None)
        }
        Statement::Load { output, type_, path } => {
            new_load::load(session, output, type_.as_deref(), path)?;
            Ok(None)
        }
        Statement::Save { input, path } => {
            save::save(session, input, path)?;
            Ok(None)
        }
        Statement::Info { input } => info::info(session, input).map(Some),
        Statement::Disp { input, attrs, limit } => disp::disp(session, input, attrs, *limit).map(Some),
        Statement::Get { .. } => {
            get::get(session, stmt)?;
            Ok(None)
        }
        Statement::Find { .. } => {
            find::find(session, stmt)?;
            Ok(None)
        }
        Statement::Join {
            output,
            input,
            path,
            input_2,
            path_2,
        } => {
            join::join(session, output, input, path, input_2, path_2)?;
            Ok(None)
        }
        Statement::Group {
            output,
            input,
            paths,
            aggregations,
        } => {
            group::group(session, output, input, paths, aggregations.as_deref())?;
            Ok(None)
        }
        Statement::Sort {
            output,
            input,
            path,
            ascending,
        } => {
            sort::sort(session, output, input, path, *ascending)?;
            Ok(None)
        }
        Statement::Apply {
            inputs,
            workflow,
            parameter,
        } => apply::apply(session, inputs, workflow, parameter).map(Some),
        Statement::Merge { output, inputs } => {
            merge::merge(session, output, inputs)?;
            Ok(None)
        }
    }
}

/// Raises `EmptyInputVariable` for commands that cannot meaningfully
/// operate on zero rows (`JOIN`, `GROUP`, `SORT`, `APPLY`, `MERGE`).
pub(super) fn guard_empty_input(var: &VarStruct) -> Result<()> {
    if var.is_empty_input() {
        return Err(KestrelError::EmptyInputVariable(var.clone()));
    }
    Ok(())
}

/// Cleans up a scratch view on drop. Holds the store borrow for its
/// whole scope — callers route every store call through
/// [`TempViewGuard::store`] rather than through `session.store` directly
/// while the guard is alive.
pub(super) struct TempViewGuard<'a> {
    store: &'a mut dyn Store,
    view: String,
}

impl<'a> TempViewGuard<'a> {
    pub fn new(store: &'a mut dyn Store, view: impl Into<String>) -> Self {
        Self {
            store,
            view: view.into(),
        }
    }

    pub fn store(&mut self) -> &mut dyn Store {
        self.store
    }

    pub fn name(&self) -> &str {
        &self.view
    }
}

impl Drop for TempViewGuard<'_> {
    fn drop(&mut self) {
        let _ = self.store.remove_view(&self.view);
    }
}
