mod combinator;
