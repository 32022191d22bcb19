mod order_book;

pub use order_book::OrderBook;
