//! Statement construction.
//!
//! Turns table metadata and snapshots into statement text plus the ordered
//! parameter list the executor binds to its `?` placeholders. The generated
//! text follows the driver's dialect: table names in double quotes, column
//! names bare.

use crate::core::db::{BoundParam, ColumnDescriptor, TableSnapshot, TypeTag, Value};
use crate::core::{MdbError, Result};
use crate::type_map::{to_bind_kind, to_schema_keyword, SchemaKeyword};
use serde::{Deserialize, Serialize};

/// How literal values in WHERE clauses are emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralMode {
    /// Every value is a bound parameter
    #[default]
    Parameterized,
    /// Key values are inlined exactly as older releases of the format
    /// tooling wrote them, unescaped
    Legacy,
}

/// Statement text and its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct StatementPlan {
    pub text: String,
    pub parameters: Vec<BoundParam>,
}

impl StatementPlan {
    fn new(text: String) -> Self {
        StatementPlan {
            text,
            parameters: Vec::new(),
        }
    }
}

/// Builds schema and data statements
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementBuilder {
    literal_mode: LiteralMode,
    boolean_as_integer: bool,
}

impl StatementBuilder {
    pub fn new() -> Self {
        StatementBuilder::default()
    }

    pub fn with_literal_mode(mut self, literal_mode: LiteralMode) -> Self {
        self.literal_mode = literal_mode;
        self
    }

    /// Creates Boolean columns as INTEGER instead of rejecting them
    pub fn with_boolean_as_integer(mut self, enabled: bool) -> Self {
        self.boolean_as_integer = enabled;
        self
    }

    pub fn literal_mode(&self) -> LiteralMode {
        self.literal_mode
    }

    fn column_keyword(&self, tag: TypeTag) -> Result<SchemaKeyword> {
        if tag == TypeTag::Boolean && self.boolean_as_integer {
            return Ok(SchemaKeyword::Integer);
        }
        to_schema_keyword(tag)
    }

    /// `CREATE TABLE "<name>" ( col KEYWORD [NOT NULL], ...);`
    ///
    /// An auto-increment integer column is written as `<name> AUTOINCREMENT`
    /// in place of its keyword; NOT NULL is appended independently.
    pub fn create_table(&self, columns: &[ColumnDescriptor], table_name: &str) -> Result<StatementPlan> {
        require_table_name(table_name)?;
        if columns.is_empty() {
            return Err(MdbError::InvalidSchema(format!(
                "table '{}' has no columns",
                table_name
            )));
        }

        let mut definitions = Vec::with_capacity(columns.len());
        for column in columns {
            let keyword = self.column_keyword(column.type_tag)?;
            let mut definition = if keyword == SchemaKeyword::Integer && column.auto_increment {
                format!("{} AUTOINCREMENT", column.name)
            } else {
                format!("{} {}", column.name, keyword)
            };
            if !column.nullable {
                definition.push_str(" NOT NULL");
            }
            definitions.push(format!(" {}", definition));
        }

        Ok(StatementPlan::new(format!(
            "CREATE TABLE \"{}\" ({});",
            table_name,
            definitions.join(",")
        )))
    }

    /// `DROP TABLE "<name>";`
    pub fn drop_table(&self, table_name: &str) -> Result<StatementPlan> {
        require_table_name(table_name)?;
        Ok(StatementPlan::new(format!("DROP TABLE \"{}\";", table_name)))
    }

    /// `DELETE FROM "<table>" WHERE <key>=?;`, or with the value inlined in
    /// legacy mode
    pub fn delete_where(&self, table_name: &str, key: &str, value: &Value) -> Result<StatementPlan> {
        require_table_name(table_name)?;
        let tag = value.tag().ok_or_else(|| {
            MdbError::InvalidSchema(format!("cannot delete from '{}' by a NULL {}", table_name, key))
        })?;

        match self.literal_mode {
            LiteralMode::Legacy => Ok(StatementPlan::new(format!(
                "DELETE FROM \"{}\" WHERE {}={};",
                table_name, key, value
            ))),
            LiteralMode::Parameterized => Ok(StatementPlan {
                text: format!("DELETE FROM \"{}\" WHERE {}=?;", table_name, key),
                parameters: vec![BoundParam::new(key, to_bind_kind(tag)?, value.clone())],
            }),
        }
    }

    /// One INSERT per row, sharing a column list that leaves out `exclude`
    /// (typically an auto-increment column the driver fills in).
    pub fn insert_rows(&self, snapshot: &TableSnapshot, exclude: Option<&str>) -> Result<Vec<StatementPlan>> {
        require_table_name(&snapshot.name)?;

        let included: Vec<usize> = snapshot
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| Some(c.name.as_str()) != exclude)
            .map(|(i, _)| i)
            .collect();
        if included.is_empty() {
            return Err(MdbError::InvalidSchema(format!(
                "no columns left to insert into '{}'",
                snapshot.name
            )));
        }

        let column_list = included
            .iter()
            .map(|&i| snapshot.columns[i].name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; included.len()].join(",");
        let text = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({});",
            snapshot.name, column_list, placeholders
        );

        let mut plans = Vec::with_capacity(snapshot.rows.len());
        for row in &snapshot.rows {
            check_row(snapshot, row)?;
            let parameters = included
                .iter()
                .map(|&i| bind(&snapshot.columns[i], &row[i]))
                .collect::<Result<Vec<_>>>()?;
            plans.push(StatementPlan {
                text: text.clone(),
                parameters,
            });
        }
        Ok(plans)
    }

    /// One UPDATE per row setting every column, matched on `primary_key`.
    ///
    /// In legacy mode the key value is inlined as a single-quoted literal;
    /// otherwise it is bound after the SET parameters. A row with a NULL key
    /// fails with `InvalidSchema`, as in `delete_where`.
    pub fn update_rows(
        &self,
        snapshot: &TableSnapshot,
        primary_key: &str,
        target_table: &str,
    ) -> Result<Vec<StatementPlan>> {
        require_table_name(target_table)?;
        if snapshot.columns.is_empty() {
            return Err(MdbError::InvalidSchema(format!(
                "no columns to update in '{}'",
                target_table
            )));
        }
        let key_index = snapshot.column_index(primary_key).ok_or_else(|| {
            MdbError::InvalidSchema(format!(
                "primary key '{}' is not a column of '{}'",
                primary_key, snapshot.name
            ))
        })?;

        let assignments = snapshot
            .columns
            .iter()
            .map(|c| format!("{}=?", c.name))
            .collect::<Vec<_>>()
            .join(",");
        let prefix = format!("UPDATE \"{}\" SET {}", target_table, assignments);

        let mut plans = Vec::with_capacity(snapshot.rows.len());
        for row in &snapshot.rows {
            check_row(snapshot, row)?;
            let mut parameters = snapshot
                .columns
                .iter()
                .zip(row)
                .map(|(column, value)| bind(column, value))
                .collect::<Result<Vec<_>>>()?;

            let key_value = &row[key_index];
            if key_value.is_null() {
                return Err(MdbError::InvalidSchema(format!(
                    "cannot update '{}' by a NULL {}",
                    target_table, primary_key
                )));
            }
            let text = match self.literal_mode {
                LiteralMode::Legacy => {
                    format!("{} WHERE {} = '{}';", prefix, primary_key, key_value)
                }
                LiteralMode::Parameterized => {
                    parameters.push(bind(&snapshot.columns[key_index], key_value)?);
                    format!("{} WHERE {} = ?;", prefix, primary_key)
                }
            };
            plans.push(StatementPlan { text, parameters });
        }
        Ok(plans)
    }
}

fn require_table_name(table_name: &str) -> Result<()> {
    if table_name.is_empty() {
        return Err(MdbError::InvalidSchema("table name is empty".to_string()));
    }
    Ok(())
}

fn check_row(snapshot: &TableSnapshot, row: &[Value]) -> Result<()> {
    if row.len() != snapshot.columns.len() {
        return Err(MdbError::InvalidSchema(format!(
            "row has {} values but table '{}' has {} columns",
            row.len(),
            snapshot.name,
            snapshot.columns.len()
        )));
    }
    Ok(())
}

fn bind(column: &ColumnDescriptor, value: &Value) -> Result<BoundParam> {
    Ok(BoundParam::new(
        column.name.clone(),
        to_bind_kind(column.type_tag)?,
        value.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_map::ParamKind;

    fn people() -> TableSnapshot {
        TableSnapshot::new(
            "People",
            vec![
                ColumnDescriptor::new("id", TypeTag::Int32).not_null().auto_increment(),
                ColumnDescriptor::new("name", TypeTag::String),
            ],
        )
    }

    #[test]
    fn test_create_table() {
        let table = people();
        let plan = StatementBuilder::new().create_table(&table.columns, "People").unwrap();
        insta::assert_snapshot!(plan.text, @r#"CREATE TABLE "People" ( id AUTOINCREMENT NOT NULL, name TEXT);"#);
        assert!(plan.parameters.is_empty());
    }

    #[test]
    fn test_create_table_keywords() {
        let columns = vec![
            ColumnDescriptor::new("n", TypeTag::UInt64),
            ColumnDescriptor::new("price", TypeTag::Decimal).not_null(),
            ColumnDescriptor::new("photo", TypeTag::Binary),
            // auto-increment only applies to integer columns
            ColumnDescriptor::new("label", TypeTag::String).auto_increment(),
        ];
        let plan = StatementBuilder::new().create_table(&columns, "Items").unwrap();
        insta::assert_snapshot!(plan.text, @r#"CREATE TABLE "Items" ( n INTEGER, price DOUBLE NOT NULL, photo IMAGE, label TEXT);"#);
    }

    #[test]
    fn test_create_table_rejects_bad_input() {
        let builder = StatementBuilder::new();
        let columns = people().columns;

        assert!(matches!(builder.create_table(&columns, ""), Err(MdbError::InvalidSchema(_))));
        assert!(matches!(builder.create_table(&[], "People"), Err(MdbError::InvalidSchema(_))));

        let flags = vec![ColumnDescriptor::new("active", TypeTag::Boolean)];
        assert!(matches!(builder.create_table(&flags, "Flags"), Err(MdbError::UnsupportedType(_))));

        let plan = builder.with_boolean_as_integer(true).create_table(&flags, "Flags").unwrap();
        assert_eq!(plan.text, "CREATE TABLE \"Flags\" ( active INTEGER);");
    }

    #[test]
    fn test_drop_table() {
        let plan = StatementBuilder::new().drop_table("People").unwrap();
        assert_eq!(plan.text, "DROP TABLE \"People\";");
        assert!(StatementBuilder::new().drop_table("").is_err());
    }

    #[test]
    fn test_delete_where() {
        let plan = StatementBuilder::new().delete_where("People", "id", &Value::Int32(7)).unwrap();
        assert_eq!(plan.text, "DELETE FROM \"People\" WHERE id=?;");
        assert_eq!(plan.parameters, vec![BoundParam::new("id", ParamKind::Int32, Value::Int32(7))]);

        let legacy = StatementBuilder::new().with_literal_mode(LiteralMode::Legacy);
        let plan = legacy.delete_where("People", "id", &Value::Int32(7)).unwrap();
        assert_eq!(plan.text, "DELETE FROM \"People\" WHERE id=7;");
        assert!(plan.parameters.is_empty());

        assert!(legacy.delete_where("People", "id", &Value::Null).is_err());
    }

    #[test]
    fn test_insert_rows_excluding_identity() {
        let table = people()
            .with_row(vec![Value::Null, "Ada".into()])
            .unwrap()
            .with_row(vec![Value::Null, "Grace".into()])
            .unwrap();

        let plans = StatementBuilder::new().insert_rows(&table, Some("id")).unwrap();
        assert_eq!(plans.len(), 2);
        insta::assert_snapshot!(plans[0].text, @r#"INSERT INTO "People" (name) VALUES (?);"#);
        assert_eq!(
            plans[1].parameters,
            vec![BoundParam::new("name", ParamKind::String, "Grace".into())]
        );
    }

    #[test]
    fn test_insert_rows_all_columns() {
        let table = TableSnapshot::new(
            "Blobs",
            vec![
                ColumnDescriptor::new("id", TypeTag::Int64),
                ColumnDescriptor::new("data", TypeTag::Binary),
            ],
        )
        .with_row(vec![1i64.into(), vec![0u8; 600].into()])
        .unwrap();

        let plans = StatementBuilder::new().insert_rows(&table, None).unwrap();
        assert_eq!(plans[0].text, "INSERT INTO \"Blobs\" (id, data) VALUES (?,?);");
        assert_eq!(plans[0].parameters[1].kind, ParamKind::Image);
    }

    #[test]
    fn test_insert_rows_edge_cases() {
        let builder = StatementBuilder::new();
        assert!(builder.insert_rows(&people(), None).unwrap().is_empty());

        let single = TableSnapshot::new("T", vec![ColumnDescriptor::new("id", TypeTag::Int32)]);
        assert!(matches!(
            builder.insert_rows(&single, Some("id")),
            Err(MdbError::InvalidSchema(_))
        ));

        let mut ragged = people();
        ragged.rows.push(vec![Value::Null]);
        assert!(matches!(builder.insert_rows(&ragged, None), Err(MdbError::InvalidSchema(_))));
    }

    #[test]
    fn test_update_rows_legacy() {
        let table = people().with_row(vec![7i32.into(), "Ada".into()]).unwrap();
        let builder = StatementBuilder::new().with_literal_mode(LiteralMode::Legacy);

        let plans = builder.update_rows(&table, "id", "People").unwrap();
        insta::assert_snapshot!(plans[0].text, @r#"UPDATE "People" SET id=?,name=? WHERE id = '7';"#);
        assert_eq!(plans[0].parameters.len(), 2);
    }

    #[test]
    fn test_update_rows_parameterized() {
        let table = people().with_row(vec![7i32.into(), "O'Brien".into()]).unwrap();

        let plans = StatementBuilder::new().update_rows(&table, "id", "Staff").unwrap();
        assert_eq!(plans[0].text, "UPDATE \"Staff\" SET id=?,name=? WHERE id = ?;");
        assert_eq!(plans[0].parameters.len(), 3);
        assert_eq!(plans[0].parameters[2], BoundParam::new("id", ParamKind::Int32, Value::Int32(7)));
    }

    #[test]
    fn test_update_rows_null_key() {
        let table = people()
            .with_row(vec![7i32.into(), "Ada".into()])
            .unwrap()
            .with_row(vec![Value::Null, "Grace".into()])
            .unwrap();

        for mode in [LiteralMode::Parameterized, LiteralMode::Legacy] {
            let result = StatementBuilder::new().with_literal_mode(mode).update_rows(&table, "id", "People");
            assert!(matches!(result, Err(MdbError::InvalidSchema(_))));
        }
    }

    #[test]
    fn test_update_rows_unknown_key() {
        let table = people().with_row(vec![7i32.into(), "Ada".into()]).unwrap();
        let result = StatementBuilder::new().update_rows(&table, "uuid", "People");
        assert!(matches!(result, Err(MdbError::InvalidSchema(_))));
    }
}
