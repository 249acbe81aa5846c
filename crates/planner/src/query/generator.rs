//! Turns load plan tables into rendered Postgres statements.

use crate::{
    plan::TableSchema,
    query::{
        ast::{common::TableRef, create_table::ColumnDef, insert::Insert},
        builder::{copy::CopyBuilder, create_table::CreateTableBuilder, drop_table::DropTableBuilder},
        dialect::{Dialect, Postgres},
        renderer::{Render, Renderer},
    },
    table_ref,
};
use model::transform::infer::InferredColumn;

pub struct QueryGenerator<'a> {
    dialect: &'a dyn Dialect,
}

impl Default for QueryGenerator<'static> {
    fn default() -> Self {
        QueryGenerator { dialect: &Postgres }
    }
}

impl<'a> QueryGenerator<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        QueryGenerator { dialect }
    }

    fn render(&self, node: &impl Render) -> String {
        let mut renderer = Renderer::new(self.dialect);
        node.render(&mut renderer);
        renderer.finish()
    }

    pub fn drop_table_cascade(&self, table: &str) -> String {
        self.render(
            &DropTableBuilder::new(table_ref!(table))
                .if_exists()
                .cascade()
                .build(),
        )
    }

    /// `CREATE TABLE` for an explicit schema, with its primary and foreign keys.
    pub fn create_table(&self, table: &str, schema: &TableSchema) -> String {
        let mut builder = CreateTableBuilder::new(table_ref!(table));
        for column in &schema.columns {
            builder = builder.column(ColumnDef {
                name: column.name.clone(),
                data_type: column.data_type,
                is_nullable: column.nullable,
                max_length: column.max_length,
            });
        }
        builder = builder.primary_key(&schema.primary_key);
        for fk in &schema.foreign_keys {
            builder = builder.foreign_key(&fk.columns, table_ref!(fk.references), &fk.referenced_columns);
        }
        self.render(&builder.build())
    }

    /// `CREATE TABLE` with every inferred column nullable and no constraints.
    pub fn create_inferred_table(&self, table: &str, columns: &[InferredColumn]) -> String {
        let builder = columns
            .iter()
            .fold(CreateTableBuilder::new(table_ref!(table)), |b, c| {
                b.column(ColumnDef {
                    name: c.name.clone(),
                    data_type: c.data_type,
                    is_nullable: true,
                    max_length: None,
                })
            });
        self.render(&builder.build())
    }

    pub fn insert_bind(&self, table: &str, columns: &[String]) -> String {
        self.render(&Insert {
            table: table_ref!(table),
            columns: columns.to_vec(),
        })
    }

    pub fn copy_from_stdin(&self, table: &str, columns: &[String]) -> String {
        let columns = columns.iter().map(String::as_str).collect::<Vec<_>>();
        self.render(
            &CopyBuilder::new(table_ref!(table))
                .columns(&columns)
                .option("FORMAT", Some("csv"))
                .option("NULL", Some("'\\N'"))
                .build(),
        )
    }

    pub fn count_rows(&self, table: &str) -> String {
        format!("SELECT COUNT(*) FROM {};", self.table(table))
    }

    /// Each row comes back as a single JSON column.
    pub fn sample_rows(&self, table: &str, limit: usize) -> String {
        format!(
            "SELECT row_to_json(t) FROM (SELECT * FROM {} LIMIT {limit}) t;",
            self.table(table)
        )
    }

    pub fn create_database(&self, name: &str) -> String {
        format!("CREATE DATABASE {}", self.dialect.quote_identifier(name))
    }

    fn table(&self, name: &str) -> String {
        let table: TableRef = table_ref!(name);
        let mut renderer = Renderer::new(self.dialect);
        renderer.render_table_ref(&table);
        renderer.finish()
    }
}
