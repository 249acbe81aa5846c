use crate::query::ast::{common::TableRef, drop_table::DropTable};

#[derive(Debug, Clone)]
pub struct DropTableBuilder {
    ast: DropTable,
}

impl DropTableBuilder {
    pub fn new(table: TableRef) -> Self {
        Self {
            ast: DropTable {
                table,
                if_exists: false,
                cascade: false,
            },
        }
    }

    pub fn if_exists(mut self) -> Self {
        self.ast.if_exists = true;
        self
    }

    pub fn cascade(mut self) -> Self {
        self.ast.cascade = true;
        self
    }

    pub fn build(self) -> DropTable {
        self.ast
    }
}
