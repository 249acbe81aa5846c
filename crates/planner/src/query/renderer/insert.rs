use crate::query::{ast::insert::Insert, renderer::Render};

impl Render for Insert {
    fn render(&self, r: &mut super::Renderer) {
        r.sql.push_str("INSERT INTO ");
        r.render_table_ref(&self.table);
        r.sql.push_str(" (");
        r.render_identifier_list(&self.columns);
        r.sql.push_str(") VALUES (");

        let placeholders = (0..self.columns.len())
            .map(|i| r.dialect.get_placeholder(i))
            .collect::<Vec<_>>();
        r.sql.push_str(&placeholders.join(", "));
        r.sql.push_str(");");
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        query::{
            ast::insert::Insert,
            dialect::Postgres,
            renderer::{Render, Renderer},
        },
        table_ref,
    };

    #[test]
    fn test_render_insert_placeholders() {
        let ast = Insert {
            table: table_ref!("contract"),
            columns: vec!["contract_id".into(), "contract_date".into()],
        };

        let mut renderer = Renderer::new(&Postgres);
        ast.render(&mut renderer);

        assert_eq!(
            renderer.finish(),
            r#"INSERT INTO "contract" ("contract_id", "contract_date") VALUES ($1, $2);"#
        );
    }

    #[test]
    fn test_render_insert_quotes_odd_column_names() {
        let ast = Insert {
            table: table_ref!("sales"),
            columns: vec![r#"say "hi""#.into()],
        };

        let mut renderer = Renderer::new(&Postgres);
        ast.render(&mut renderer);

        assert_eq!(
            renderer.finish(),
            r#"INSERT INTO "sales" ("say ""hi""") VALUES ($1);"#
        );
    }
}
