use crate::query::ast::{
    common::TableRef,
    create_table::{ColumnDef, CreateTable, TableConstraint},
};

#[derive(Debug, Clone)]
pub struct CreateTableBuilder {
    ast: CreateTable,
}

impl CreateTableBuilder {
    pub fn new(table: TableRef) -> Self {
        Self {
            ast: CreateTable {
                table,
                ..Default::default()
            },
        }
    }

    pub fn column(mut self, column: ColumnDef) -> Self {
        self.ast.columns.push(column);
        self
    }

    pub fn primary_key(mut self, columns: &[String]) -> Self {
        if !columns.is_empty() {
            self.ast.constraints.push(TableConstraint::PrimaryKey {
                columns: columns.to_vec(),
            });
        }
        self
    }

    pub fn foreign_key(
        mut self,
        columns: &[String],
        references: TableRef,
        referenced_columns: &[String],
    ) -> Self {
        self.ast.constraints.push(TableConstraint::ForeignKey {
            columns: columns.to_vec(),
            references,
            referenced_columns: referenced_columns.to_vec(),
        });
        self
    }

    pub fn build(self) -> CreateTable {
        self.ast
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table_ref;
    use model::core::data_type::DataType;

    #[test]
    fn test_empty_primary_key_is_skipped() {
        let ast = CreateTableBuilder::new(table_ref!("parts"))
            .column(ColumnDef {
                name: "part_id".into(),
                data_type: DataType::Int,
                is_nullable: true,
                max_length: None,
            })
            .primary_key(&[])
            .build();

        assert_eq!(ast.columns.len(), 1);
        assert!(ast.constraints.is_empty());
    }
}
