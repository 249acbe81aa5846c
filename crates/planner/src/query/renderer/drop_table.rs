use crate::query::{
    ast::drop_table::DropTable,
    renderer::{Render, Renderer},
};

impl Render for DropTable {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("DROP TABLE ");
        if self.if_exists {
            r.sql.push_str("IF EXISTS ");
        }
        r.render_table_ref(&self.table);
        if self.cascade {
            r.sql.push_str(" CASCADE");
        }
        r.sql.push(';');
    }
}

#[cfg(test)]
mod tests {
    use crate::query::{
        ast::{common::TableRef, drop_table::DropTable},
        dialect::Postgres,
        renderer::{Render, Renderer},
    };

    #[test]
    fn test_render_drop_table() {
        let ast = DropTable {
            table: TableRef {
                schema: None,
                name: "loan".to_string(),
            },
            if_exists: true,
            cascade: true,
        };

        let mut renderer = Renderer::new(&Postgres);
        ast.render(&mut renderer);
        let sql = renderer.finish();

        assert_eq!(sql, r#"DROP TABLE IF EXISTS "loan" CASCADE;"#);
    }
}
