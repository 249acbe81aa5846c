use crate::query::{
    ast::create_table::{ColumnDef, CreateTable, TableConstraint},
    renderer::{Render, Renderer},
};

impl Render for CreateTable {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("CREATE TABLE ");
        r.render_table_ref(&self.table);
        r.sql.push_str(" (");

        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            render_column(column, r);
        }

        for constraint in &self.constraints {
            r.sql.push_str(", ");
            render_constraint(constraint, r);
        }

        r.sql.push_str(");");
    }
}

fn render_column(column: &ColumnDef, r: &mut Renderer) {
    r.sql.push_str(&r.dialect.quote_identifier(&column.name));
    r.sql.push(' ');
    r.sql
        .push_str(&r.dialect.render_data_type(&column.data_type, column.max_length));
    if !column.is_nullable {
        r.sql.push_str(" NOT NULL");
    }
}

fn render_constraint(constraint: &TableConstraint, r: &mut Renderer) {
    match constraint {
        TableConstraint::PrimaryKey { columns } => {
            r.sql.push_str("PRIMARY KEY (");
            r.render_identifier_list(columns);
            r.sql.push(')');
        }
        TableConstraint::ForeignKey {
            columns,
            references,
            referenced_columns,
        } => {
            r.sql.push_str("FOREIGN KEY (");
            r.render_identifier_list(columns);
            r.sql.push_str(") REFERENCES ");
            r.render_table_ref(references);
            r.sql.push_str(" (");
            r.render_identifier_list(referenced_columns);
            r.sql.push(')');
        }
    }
}
