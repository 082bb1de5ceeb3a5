//! Table normalization.

use mdtree_ast::{AlignKind, Node as SourceNode};
use mdtree_doc::{Align, Element, ElementKind, Node};

use crate::Converter;

fn to_align(kind: AlignKind) -> Align {
    match kind {
        AlignKind::Left => Align::Left,
        AlignKind::Right => Align::Right,
        AlignKind::Center => Align::Center,
    }
}

impl Converter {
    /// Convert a table, padding short rows with empty cells.
    ///
    /// Every row ends up with as many cells as the widest row. Cells of the
    /// first row are titles. Padding cells carry no alignment.
    pub(crate) fn convert_table(&self, align: &[Option<AlignKind>], rows: &[SourceNode]) -> Node {
        let mut cells: Vec<Vec<Node>> = rows
            .iter()
            .enumerate()
            .map(|(row_index, row)| {
                row.children()
                    .iter()
                    .enumerate()
                    .map(|(column, cell)| {
                        let kind = ElementKind::TableCell {
                            align: align.get(column).copied().flatten().map(to_align),
                            title: row_index == 0,
                        };
                        Element::new(kind, self.convert_inner(cell)).into()
                    })
                    .collect()
            })
            .collect();

        let width = cells.iter().map(Vec::len).max().unwrap_or(0);
        for (row_index, row) in cells.iter_mut().enumerate() {
            if row.len() < width {
                tracing::trace!(row = row_index, have = row.len(), width, "Padding table row");
            }
            while row.len() < width {
                row.push(
                    Element::void(ElementKind::TableCell {
                        align: None,
                        title: row_index == 0,
                    })
                    .into(),
                );
            }
        }

        let rows = cells
            .into_iter()
            .map(|row| Element::new(ElementKind::TableRow, row).into())
            .collect();
        Element::new(ElementKind::Table, rows).into()
    }
}
