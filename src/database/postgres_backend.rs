use crate::database::Backend;
use crate::database::DatabaseError;
use crate::dataset::Dataset;
use crate::dataset::Value;
use crate::error::SheetLoaderError;
use crate::schema::infer_column_type;
use crate::schema::SqlType;
use chrono::NaiveDateTime;
use postgres::binary_copy::BinaryCopyInWriter;
use postgres::types::ToSql;
use postgres::types::Type;
use postgres::Client;
use postgres::NoTls;
use url::Url;

/// A PostgreSQL server reached over a plain connection.
pub(super) struct PostgresBackend {
    client: Client,
}

impl PostgresBackend {
    pub(super) fn connect(url: &Url) -> Result<Self, SheetLoaderError> {
        let client = Client::connect(url.as_str(), NoTls)?;
        Ok(Self { client })
    }
}

impl Backend for PostgresBackend {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn execute(&mut self, sql: &str) -> Result<(), SheetLoaderError> {
        self.client.batch_execute(sql)?;
        Ok(())
    }

    /// Streams every row with a single binary `COPY ... FROM STDIN`.
    fn append(&mut self, table_name: &str, dataset: &Dataset) -> Result<usize, SheetLoaderError> {
        let sql_types: Vec<SqlType> = dataset
            .columns()
            .iter()
            .map(|column| infer_column_type(column.kind()))
            .collect();
        let types: Vec<Type> = sql_types.iter().map(|sql_type| copy_type(*sql_type)).collect();
        let names: Vec<&str> = dataset.columns().iter().map(|column| column.name()).collect();
        let sql = format!("COPY {} ({}) FROM STDIN BINARY", table_name, names.join(", "));

        let sink = self.client.copy_in(sql.as_str())?;
        let mut writer = BinaryCopyInWriter::new(sink, &types);
        let mut rows = 0usize;
        for row in dataset.rows() {
            let values = row
                .into_iter()
                .zip(names.iter().zip(&sql_types))
                .map(|(value, (name, sql_type))| to_postgres(name, value, *sql_type))
                .collect::<Result<Vec<_>, _>>()?;
            let params: Vec<&(dyn ToSql + Sync)> = values.iter().map(|value| value.as_ref()).collect();
            writer.write(&params)?;
            rows += 1;
        }
        writer.finish()?;
        Ok(rows)
    }
}

fn copy_type(sql_type: SqlType) -> Type {
    match sql_type {
        SqlType::Int => Type::INT4,
        SqlType::Float => Type::FLOAT8,
        SqlType::Boolean => Type::BOOL,
        SqlType::Timestamp => Type::TIMESTAMP,
        SqlType::Text => Type::TEXT,
    }
}

/// Converts a dataset value to the binary representation of its column type.
fn to_postgres(
    column_name: &str,
    value: &Value,
    sql_type: SqlType,
) -> Result<Box<dyn ToSql + Sync>, SheetLoaderError> {
    let mismatch = || DatabaseError::ValueTypeError(column_name.to_owned(), value.to_string(), sql_type);
    let converted: Box<dyn ToSql + Sync> = match (value, sql_type) {
        (Value::Null, SqlType::Int) => Box::new(None::<i32>),
        (Value::Null, SqlType::Float) => Box::new(None::<f64>),
        (Value::Null, SqlType::Boolean) => Box::new(None::<bool>),
        (Value::Null, SqlType::Timestamp) => Box::new(None::<NaiveDateTime>),
        (Value::Null, SqlType::Text) => Box::new(None::<String>),
        (Value::Integer(number), SqlType::Int) => Box::new(i32::try_from(*number).map_err(|_| mismatch())?),
        (Value::Integer(number), SqlType::Float) => Box::new(*number as f64),
        (Value::Float(number), SqlType::Float) => Box::new(*number),
        (Value::Boolean(flag), SqlType::Boolean) => Box::new(*flag),
        (Value::Timestamp(timestamp), SqlType::Timestamp) => Box::new(*timestamp),
        (value, SqlType::Text) => Box::new(value.to_string()),
        _ => Err(mismatch())?,
    };
    Ok(converted)
}
