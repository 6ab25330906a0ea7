//! Render isolation for list items.
//!
//! A list view asks [`RenderGate::decide`] before repainting a row. Moving a
//! row shifts the position of its neighbours, but their content is unchanged,
//! so only rows whose payload changed repaint. Position-dependent chrome (the
//! enabled state of move buttons) comes from [`BoundaryChrome`], which a view
//! computes outside the gated subtree.

use curator_types::{EntityId, OrderedEntity};
use std::collections::HashMap;

/// What a list view passes to one row.
#[derive(Debug, PartialEq)]
pub struct ItemProps<'a, E> {
    pub item: &'a E,
    pub index: usize,
    pub is_first: bool,
    pub is_last: bool,
    pub total: usize,
}

impl<E> Clone for ItemProps<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for ItemProps<'_, E> {}

impl<'a, E: OrderedEntity> ItemProps<'a, E> {
    /// Props of `items[index]`, or `None` if out of range.
    pub fn at(items: &'a [E], index: usize) -> Option<Self> {
        let item = items.get(index)?;
        Some(Self {
            item,
            index,
            is_first: index == 0,
            is_last: index + 1 == items.len(),
            total: items.len(),
        })
    }

    /// Props of every row of `items`.
    pub fn all(items: &'a [E]) -> Vec<Self> {
        (0..items.len())
            .filter_map(|index| Self::at(items, index))
            .collect()
    }
}

/// Outcome of the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repaint {
    Skip,
    Render,
}

/// Per-item equality check consulted before repaint.
#[derive(Debug, Default, Clone, Copy)]
pub struct RenderGate;

impl RenderGate {
    /// Skips the repaint when every field except `order` is unchanged.
    /// Position props are ignored.
    pub fn decide<E: OrderedEntity>(prev: &ItemProps<'_, E>, next: &ItemProps<'_, E>) -> Repaint {
        if prev.item.content_eq(next.item) {
            Repaint::Skip
        } else {
            Repaint::Render
        }
    }

    /// Ids in `next` that must repaint: new rows and rows whose content
    /// changed. Order of `next` is kept.
    pub fn diff_list<E: OrderedEntity>(prev: &[E], next: &[E]) -> Vec<EntityId> {
        let before: HashMap<&EntityId, &E> = prev.iter().map(|item| (item.id(), item)).collect();
        next.iter()
            .filter(|item| match before.get(item.id()) {
                Some(old) => !old.content_eq(item),
                None => true,
            })
            .map(|item| item.id().clone())
            .collect()
    }
}

/// Position-dependent affordances of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryChrome {
    pub can_move_up: bool,
    pub can_move_down: bool,
}

impl BoundaryChrome {
    pub fn of<E>(props: &ItemProps<'_, E>) -> Self {
        Self {
            can_move_up: !props.is_first,
            can_move_down: !props.is_last,
        }
    }

    /// Ids in `next` whose chrome differs from their chrome in `prev`.
    pub fn diff_list<E: OrderedEntity>(prev: &[E], next: &[E]) -> Vec<EntityId> {
        let before: HashMap<&EntityId, BoundaryChrome> = ItemProps::all(prev)
            .iter()
            .map(|props| (props.item.id(), Self::of(props)))
            .collect();
        ItemProps::all(next)
            .iter()
            .filter(|props| before.get(props.item.id()) != Some(&Self::of(props)))
            .map(|props| props.item.id().clone())
            .collect()
    }
}
