//! Prompt templates for SQL translation
//!
//! The schema block is a single constant so every prompt that embeds it sends
//! exactly the same bytes to the model.

use crate::session::Turn;
use std::fmt::Write as _;

/// Data dictionary of the target database
pub const SCHEMA_BLOCK: &str = r"You are an AI assistant that transforms user questions into SQL queries to retrieve data from a BigQuery database.
Below is the detailed schema of the database, including table names, column names, data types, and descriptions.
Use this information to generate accurate SQL queries based on user input.

### Data Dictionary

#### Table: Customers
| Column Name       | Data Type | Description                                  |
|-------------------|-----------|----------------------------------------------|
| customer_id       | INT64     | The unique ID of the customer (Primary Key)  |
| first_name        | STRING    | The first name of the customer               |
| last_name         | STRING    | The last name of the customer                |
| email             | STRING    | The email address of the customer            |
| phone_number      | STRING    | The phone number of the customer             |
| registration_date | DATE      | The date the customer registered             |

#### Table: Orders
| Column Name  | Data Type | Description                                                          |
|--------------|-----------|----------------------------------------------------------------------|
| order_id     | INT64     | The unique ID of the order (Primary Key)                             |
| customer_id  | INT64     | The ID of the customer who made the order (Foreign Key to Customers) |
| order_date   | DATE      | The date when the order was placed                                   |
| total_amount | FLOAT64   | The total amount for the order                                       |
| order_status | STRING    | The current status of the order (e.g., pending, completed, canceled) |

#### Table: Products
| Column Name    | Data Type | Description                                 |
|----------------|-----------|---------------------------------------------|
| product_id     | INT64     | The unique ID of the product (Primary Key)  |
| product_name   | STRING    | The name of the product                     |
| category       | STRING    | The category of the product                 |
| price          | FLOAT64   | The price of the product                    |
| stock_quantity | INT64     | The quantity of the product in stock        |

#### Table: OrderDetails
| Column Name     | Data Type | Description                                     |
|-----------------|-----------|-------------------------------------------------|
| order_detail_id | INT64     | The unique ID of the order detail (Primary Key) |
| order_id        | INT64     | The ID of the order (Foreign Key to Orders)     |
| product_id      | INT64     | The ID of the product (Foreign Key to Products) |
| quantity        | INT64     | The quantity of the product ordered             |
| price_per_unit  | FLOAT64   | The price per unit of the product               |

#### Table: Payments
| Column Name    | Data Type | Description                                             |
|----------------|-----------|---------------------------------------------------------|
| payment_id     | INT64     | The unique ID of the payment (Primary Key)              |
| order_id       | INT64     | The ID of the order (Foreign Key to Orders)             |
| payment_date   | DATE      | The date the payment was made                           |
| payment_amount | FLOAT64   | The amount of the payment                               |
| payment_method | STRING    | The method used for payment (e.g., credit_card, paypal) |

### Relationships between tables:
- `Orders.customer_id` references `Customers.customer_id`.
- `OrderDetails.order_id` references `Orders.order_id`.
- `OrderDetails.product_id` references `Products.product_id`.
- `Payments.order_id` references `Orders.order_id`.
";

const GREETING_PROMPT: &str = "Greet the user as a friendly and knowledgeable data engineer. \
Introduce yourself (you are an AI assistant) and let the user know you're here to assist with \
any questions they may have about transforming user questions into SQL queries to retrieve data \
from a BigQuery database.";

const TRANSLATION_INSTRUCTION: &str = "Based on the user's input, generate an appropriate SQL \
query to retrieve the requested information from the database. \
Be precise and ensure that the query follows SQL syntax correctly.";

const REPLAY_INSTRUCTION: &str = "You are an AI assistant that transforms user questions into SQL \
queries to retrieve data from a BigQuery database. \
Use the schema information and generate a SQL query based on the user's input.";

/// Prompt asking the model to introduce itself
pub fn greeting() -> &'static str {
    GREETING_PROMPT
}

/// Full translation prompt: schema, the whole transcript, then the instruction.
///
/// Each turn is rendered on its own line as `<role>: <text>`.
pub fn translation(transcript: &[Turn]) -> String {
    let history_len: usize = transcript.iter().map(|t| t.text.len() + 12).sum();
    let mut prompt = String::with_capacity(
        SCHEMA_BLOCK.len() + history_len + TRANSLATION_INSTRUCTION.len() + 2,
    );

    prompt.push_str(SCHEMA_BLOCK);
    prompt.push('\n');
    for turn in transcript {
        // Writing into a String cannot fail
        let _ = writeln!(prompt, "{}: {}", turn.role, turn.text);
    }
    prompt.push_str(TRANSLATION_INSTRUCTION);
    prompt
}

/// Terse prompt for replaying one question from history.
///
/// Carries no prior turns and no schema block.
pub fn replay(question: &str) -> String {
    format!("{REPLAY_INSTRUCTION} User's input: '{question}'.")
}
